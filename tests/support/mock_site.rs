//! A small fake LMS served by wiremock: dashboard, course pages, folder
//! pages and file content, laid out the way the crawler expects.

use std::path::Path;

use coursesync_core::{Config, Crawler, HttpClient, RetryPolicy};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_TOKEN: &str = "integration-token";

pub struct SiteFile {
    pub name: &'static str,
    pub body: &'static [u8],
    pub last_modified: Option<String>,
}

impl SiteFile {
    pub fn new(name: &'static str, body: &'static [u8], last_modified: &str) -> Self {
        Self {
            name,
            body,
            last_modified: Some(last_modified.to_string()),
        }
    }

    pub fn without_last_modified(name: &'static str, body: &'static [u8]) -> Self {
        Self {
            name,
            body,
            last_modified: None,
        }
    }
}

pub struct SiteFolder {
    pub id: u64,
    pub name: &'static str,
    pub files: Vec<SiteFile>,
}

pub struct SiteCourse {
    pub id: u64,
    pub name: &'static str,
    pub folders: Vec<SiteFolder>,
}

pub fn file_path(folder_id: u64, name: &str) -> String {
    format!("/pluginfile.php/{folder_id}/mod_folder/content/0/{name}")
}

fn dashboard_html(courses: &[SiteCourse]) -> String {
    let items: String = courses
        .iter()
        .map(|c| {
            format!(
                r#"<div class="card courses-view-course-item"><a href="/course/view.php?id={}">{}</a></div>"#,
                c.id, c.name
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="myoverview_courses_view_in_progress">{items}</div></body></html>"#
    )
}

fn course_html(course: &SiteCourse) -> String {
    let items: String = course
        .folders
        .iter()
        .map(|f| {
            format!(
                r#"<li class="activity folder modtype_folder"><a href="/mod/folder/view.php?id={}">{}</a></li>"#,
                f.id, f.name
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="region-main"><ul class="course-content">{items}</ul></div></body></html>"#
    )
}

fn folder_html(course: &SiteCourse, folder: &SiteFolder) -> String {
    let anchors: String = folder
        .files
        .iter()
        .map(|f| {
            format!(
                r#"<li><a href="{}?forcedownload=1">{}</a></li>"#,
                file_path(folder.id, f.name),
                f.name
            )
        })
        .collect();
    format!(
        r##"<html><body>
        <header id="page-header">
          <div class="page-header-headings"><h1>{}</h1></div>
          <ol class="breadcrumb">
            <li class="breadcrumb-item"><a href="#">Home</a></li>
            <li class="breadcrumb-item">{}</li>
          </ol>
        </header>
        <div id="region-main"><div class="foldertree"><ul>{anchors}</ul></div></div>
        </body></html>"##,
        course.name, folder.name
    )
}

/// Mounts dashboard, course, folder and file endpoints for `courses`.
pub async fn mount_site(server: &MockServer, courses: &[SiteCourse]) {
    Mock::given(method("GET"))
        .and(path("/my/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(dashboard_html(courses)))
        .mount(server)
        .await;

    for course in courses {
        Mock::given(method("GET"))
            .and(path("/course/view.php"))
            .and(query_param("id", course.id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(course_html(course)))
            .mount(server)
            .await;

        for folder in &course.folders {
            Mock::given(method("GET"))
                .and(path("/mod/folder/view.php"))
                .and(query_param("id", folder.id.to_string()))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(folder_html(course, folder)),
                )
                .mount(server)
                .await;

            for file in &folder.files {
                let mut head = ResponseTemplate::new(200);
                let mut get = ResponseTemplate::new(200).set_body_bytes(file.body.to_vec());
                if let Some(last_modified) = &file.last_modified {
                    head = head.insert_header("Last-Modified", last_modified.as_str());
                    get = get.insert_header("Last-Modified", last_modified.as_str());
                }
                let route = file_path(folder.id, file.name);
                Mock::given(method("HEAD"))
                    .and(path(route.as_str()))
                    .respond_with(head)
                    .mount(server)
                    .await;
                Mock::given(method("GET"))
                    .and(path(route.as_str()))
                    .respond_with(get)
                    .mount(server)
                    .await;
            }
        }
    }
}

pub fn config_for(server: &MockServer, root: &Path) -> Config {
    let mut config = Config::new(SESSION_TOKEN).unwrap();
    config.base_url = Url::parse(&server.uri()).unwrap();
    config.sync_directory = root.to_path_buf();
    config.purify_course_names = true;
    config
}

pub fn crawler_for(server: &MockServer, root: &Path) -> Crawler {
    let config = config_for(server, root);
    let client = HttpClient::new(&config)
        .unwrap()
        .with_retry_policy(RetryPolicy::immediate(1));
    Crawler::new(config, client)
}

/// Number of content GETs the server has seen.
pub async fn content_downloads(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path().starts_with("/pluginfile.php/"))
        .count()
}
