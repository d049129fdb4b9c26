//! Three-level traversal: course list → course pages → folder pages → files.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::error::CrawlError;
use super::stats::CrawlStats;
use crate::config::Config;
use crate::extract::{CourseId, FolderId, extract_courses, extract_files, extract_folders};
use crate::failure;
use crate::sync::SyncEngine;
use crate::transport::HttpClient;

/// Drives one crawl-and-sync run.
///
/// Course pages and folder pages are processed by spawned tasks, at most
/// `crawl_concurrency` at a time. Files inside one folder are synchronized
/// one after the other.
#[derive(Debug)]
pub struct Crawler {
    config: Arc<Config>,
    client: HttpClient,
    engine: Arc<SyncEngine>,
    semaphore: Arc<Semaphore>,
}

impl Crawler {
    /// Creates a crawler for `config`'s site and mirror directory.
    #[must_use]
    pub fn new(config: Config, client: HttpClient) -> Self {
        let concurrency = config.crawl_concurrency.max(1);
        debug!(concurrency, root = %config.sync_directory.display(), "creating crawler");
        Self {
            engine: Arc::new(SyncEngine::new(client.clone(), config.clone())),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            config: Arc::new(config),
            client,
        }
    }

    /// Runs the full traversal.
    ///
    /// Failures below the course list are logged, counted and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] only when the course list itself cannot be
    /// fetched or scraped.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn run(&self) -> Result<CrawlStats, CrawlError> {
        let stats = Arc::new(CrawlStats::new());

        let index_url = self.config.course_index_url();
        let html = match self.client.get_text(&index_url).await {
            Ok(html) => html,
            Err(e) => {
                failure::report("course list", &e);
                return Err(CrawlError::listing(index_url, e));
            }
        };
        let courses =
            extract_courses(&html).map_err(|e| CrawlError::extraction(&index_url, e))?;
        info!(count = courses.len(), "courses found");

        let folders = self.list_folders(courses, &stats).await;
        self.crawl_folders(folders, &stats).await;

        debug!(
            downloaded = stats.downloaded(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            failed_branches = stats.failed_branches(),
            "crawl complete"
        );

        // Every task has been joined, so this is normally the last reference.
        Ok(Arc::try_unwrap(stats).unwrap_or_else(|shared| shared.snapshot()))
    }

    /// Fetches every course page and returns its folders, in course order.
    async fn list_folders(
        &self,
        courses: Vec<CourseId>,
        stats: &Arc<CrawlStats>,
    ) -> Vec<(CourseId, FolderId)> {
        let mut handles = Vec::with_capacity(courses.len());

        for course in courses {
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                warn!("crawl semaphore closed");
                break;
            };
            let client = self.client.clone();
            let config = Arc::clone(&self.config);
            let stats = Arc::clone(stats);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                info!("CRAWL: course {course}");
                let url = config.course_url(course.0);
                let html = match client.get_text(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        failure::report(&format!("course {course}"), &e);
                        stats.increment_failed_branches();
                        return Vec::new();
                    }
                };
                match extract_folders(&html) {
                    Ok(folders) => {
                        debug!(%course, count = folders.len(), "folders found");
                        folders.into_iter().map(|folder| (course, folder)).collect()
                    }
                    Err(e) => {
                        warn!(%course, url = %url, error = %e, "could not scrape course page");
                        stats.increment_failed_branches();
                        Vec::new()
                    }
                }
            }));
        }

        let mut folders = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(found) => folders.extend(found),
                Err(e) => {
                    warn!(error = %e, "course task panicked");
                    stats.increment_failed_branches();
                }
            }
        }
        folders
    }

    /// Crawls every folder page and synchronizes its files.
    async fn crawl_folders(&self, folders: Vec<(CourseId, FolderId)>, stats: &Arc<CrawlStats>) {
        let mut handles = Vec::with_capacity(folders.len());

        for (course, folder) in folders {
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                warn!("crawl semaphore closed");
                break;
            };
            let client = self.client.clone();
            let config = Arc::clone(&self.config);
            let engine = Arc::clone(&self.engine);
            let stats = Arc::clone(stats);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                crawl_folder(&client, &config, &engine, &stats, course, folder).await;
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "folder task panicked");
                stats.increment_failed_branches();
            }
        }
    }
}

async fn crawl_folder(
    client: &HttpClient,
    config: &Config,
    engine: &SyncEngine,
    stats: &CrawlStats,
    course: CourseId,
    folder: FolderId,
) {
    info!("CRAWL: course {course} / folder {folder}");
    let url = config.folder_url(folder.0);
    let html = match client.get_text(&url).await {
        Ok(html) => html,
        Err(e) => {
            failure::report(&format!("course {course} / folder {folder}"), &e);
            stats.increment_failed_branches();
            return;
        }
    };
    let files = match extract_files(&html, config.purify_course_names) {
        Ok(files) => files,
        Err(e) => {
            warn!(%course, %folder, url = %url, error = %e, "could not scrape folder page");
            stats.increment_failed_branches();
            return;
        }
    };
    debug!(%course, %folder, count = files.len(), "files found");

    for file in &files {
        match engine.sync_file(file).await {
            Ok(outcome) => stats.record_outcome(outcome),
            Err(e) => {
                stats.increment_failed();
                if let Some(transport) = e.transport() {
                    failure::report(&format!("file {}", file.file), transport);
                }
                if e.left_partial_file() {
                    warn!(
                        path = %engine.destination(file).display(),
                        "download stopped midway; the local file may be incomplete"
                    );
                }
                warn!(file = %file.file, source_url = %file.source_url, error = %e, "file sync failed");
            }
        }
    }
}
