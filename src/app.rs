#![cfg(not(tarpaulin_include))]

use std::fs;
use std::path::Path;

use axum::{
    Router,
    extract::{Multipart, Query},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::error::DatasetError;
use crate::session::{self, SESSION_COOKIE, SessionRecord};
use crate::{loader, mining, render, transform};

/// Directory uploaded spreadsheets are written to
pub const UPLOAD_DIR: &str = "uploads";

const BIND_ADDR: &str = "127.0.0.1:3000";

lazy_static! {
    // Anything outside this set is replaced when sanitizing upload names
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

#[derive(Deserialize)]
struct HomeParams {
    error: Option<String>,
}

/// Start the web application
///
/// Builds the router, ensures the upload directory exists and serves on the
/// fixed bind address until shutdown.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(UPLOAD_DIR)?;

    let app = Router::new()
        .route("/", get(home).post(upload))
        .route("/dataset", get(dataset_view))
        .route("/dataset/", get(dataset_view));

    let listener = TcpListener::bind(BIND_ADDR).await?;
    println!("Listening on http://{}", BIND_ADDR);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the home page
///
/// Upload form plus the caller's session state: first 100 table rows, all
/// mined itemsets and rules. With no session record the page shows its
/// "nothing loaded" placeholders.
async fn home(jar: CookieJar, Query(params): Query<HomeParams>) -> Html<String> {
    let record = current_record(&jar);
    let table = record.as_ref().and_then(|r| r.table().ok());

    let page = match &record {
        Some(record) => render::home_page(
            table.as_ref(),
            &record.itemsets,
            &record.rules,
            params.error.as_deref(),
        ),
        None => render::home_page(None, &[], &[], params.error.as_deref()),
    };

    Html(page)
}

/// Handle an upload-and-mine request
///
/// Multipart form: `file` (the spreadsheet) plus `min_support` and
/// `min_threshold` decimal fields, both defaulting to 0 ("no filtering").
/// A request without a file is a no-op redirect back to the home page.
/// Dataset problems come back as a user-facing message on the home page.
async fn upload(jar: CookieJar, mut multipart: Multipart) -> Response {
    let mut file_name = String::new();
    let mut file_data: Vec<u8> = Vec::new();
    let mut min_support = 0.0_f64;
    let mut min_threshold = 0.0_f64;

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or("").to_string();
                file_data = field.bytes().await.unwrap_or_default().to_vec();
            }
            "min_support" => {
                min_support = parse_threshold(field.text().await.unwrap_or_default());
            }
            "min_threshold" => {
                min_threshold = parse_threshold(field.text().await.unwrap_or_default());
            }
            _ => {}
        }
    }

    if file_name.is_empty() || file_data.is_empty() {
        return Redirect::to("/").into_response();
    }

    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    match process_upload(
        &file_name,
        &file_data,
        min_support,
        min_threshold,
        session_id.as_deref(),
    ) {
        Ok(new_id) => {
            let cookie = Cookie::new(SESSION_COOKIE, new_id);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Err(e) => {
            log::warn!("upload rejected: {}", e);
            let message = if e.is_user_error() {
                e.to_string()
            } else {
                "internal error while processing the upload".to_string()
            };
            Redirect::to(&format!("/?error={}", urlencoding::encode(&message))).into_response()
        }
    }
}

/// Serve the dataset page (both `/dataset` and `/dataset/`)
///
/// Shows the full stored table and the uploaded filename. Redirects home when
/// there is no session record or the stored table is empty.
async fn dataset_view(jar: CookieJar) -> Response {
    let Some(record) = current_record(&jar) else {
        return Redirect::to("/").into_response();
    };

    let table = match record.table() {
        Ok(table) => table,
        Err(e) => {
            log::warn!("session table failed to deserialize: {}", e);
            return Redirect::to("/").into_response();
        }
    };

    if table.is_empty() {
        return Redirect::to("/").into_response();
    }

    Html(render::dataset_page(&table, &record.file_name)).into_response()
}

/// Persist, parse and mine one upload; returns the session id used
fn process_upload(
    file_name: &str,
    file_data: &[u8],
    min_support: f64,
    min_threshold: f64,
    session_id: Option<&str>,
) -> Result<String, DatasetError> {
    let safe_name = sanitize_file_name(file_name);
    let path = Path::new(UPLOAD_DIR).join(&safe_name);
    // Same-name uploads overwrite earlier ones
    fs::write(&path, file_data)?;

    let table = loader::load_table(&path)?;
    log::info!("dataset loaded with {} rows", table.len());

    let cleaned = transform::clean_transactions(&table)?;
    let matrix = transform::incidence_matrix(&cleaned)?;
    let (itemsets, rules) = mining::mine(&matrix, min_support, min_threshold);

    session::store_dataset(session_id, &cleaned, &safe_name, itemsets, rules)
}

fn current_record(jar: &CookieJar) -> Option<SessionRecord> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| session::get_record(cookie.value()))
}

fn parse_threshold(text: String) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

/// Reduce a client-supplied filename to a safe basename
///
/// Path components and shell metacharacters are stripped so the name cannot
/// escape the upload directory.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let safe = UNSAFE_CHARS.replace_all(base, "_");
    let safe = safe.trim_start_matches('.').to_string();
    if safe.is_empty() {
        "upload.dat".to_string()
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("basket.csv"), "basket.csv");
        assert_eq!(sanitize_file_name("Online Retail.xlsx"), "Online_Retail.xlsx");
    }

    #[test]
    fn sanitize_strips_path_traversal() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_file_name("/absolute/path.csv"), "path.csv");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_file_name(""), "upload.dat");
        assert_eq!(sanitize_file_name("..."), "upload.dat");
    }

    #[test]
    fn thresholds_default_to_zero() {
        assert_eq!(parse_threshold(String::new()), 0.0);
        assert_eq!(parse_threshold("not a number".to_string()), 0.0);
        assert_eq!(parse_threshold(" 0.35 ".to_string()), 0.35);
    }
}
