use actix_web::{HttpRequest, HttpResponse, Responder, http, web};

use crate::db::store::QrStore;
use crate::models::scan_outcome::ScanOutcome;
use crate::services::change_feed::ChangeEvent;
use crate::services::scan_validator::validate_and_record_scan;
use crate::state::app_state::AppState;
use crate::structs::scan_request::{ScanParams, ScanResponse};
use crate::utils::fingerprint::{ClientTraits, fingerprint};

/// Scan landing page: validates the scan and renders the outcome.
///
/// The URL inside a QR image carries no client traits, so a bare request gets a
/// page that reads the screen size and language in the browser and reloads
/// itself with them. Nothing is recorded until that second request.
pub async fn scan_page<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ScanParams>,
) -> impl Responder {
    if query.w.is_none() || query.h.is_none() {
        return HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(CLIENT_TRAITS_PAGE);
    }

    let code = path.into_inner();
    let outcome = handle_scan(&app_state, &req, &code, &query).await;

    let settings = &app_state.settings;
    let redirect = (outcome == ScanOutcome::Success)
        .then(|| (settings.redirect_url.as_str(), settings.redirect_delay_secs));

    HttpResponse::build(outcome.status_code())
        .content_type("text/html; charset=utf-8")
        .body(render_outcome_page(outcome, redirect))
}

/// Same as `scan_page`, for clients that render the outcome themselves
pub async fn scan_api<S: QrStore + 'static>(
    app_state: web::Data<AppState<S>>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ScanParams>,
) -> impl Responder {
    let code = path.into_inner();
    let outcome = handle_scan(&app_state, &req, &code, &query).await;

    let success = outcome == ScanOutcome::Success;
    HttpResponse::build(outcome.status_code()).json(ScanResponse {
        status: outcome,
        message: outcome.message(),
        redirect_url: success.then(|| app_state.settings.redirect_url.clone()),
        redirect_after_secs: success.then_some(app_state.settings.redirect_delay_secs),
    })
}

async fn handle_scan<S: QrStore>(
    app_state: &AppState<S>,
    req: &HttpRequest,
    code: &str,
    params: &ScanParams,
) -> ScanOutcome {
    let user_fingerprint = client_fingerprint(req, params, &app_state.settings.fingerprint_salt);
    let now = chrono::Utc::now().timestamp_millis();

    let outcome = validate_and_record_scan(&app_state.store, code, &user_fingerprint, now).await;
    if outcome == ScanOutcome::Success {
        app_state.changes.publish(ChangeEvent::ScanRecorded {
            code: code.to_string(),
        });
    }
    outcome
}

fn client_fingerprint(req: &HttpRequest, params: &ScanParams, salt: &str) -> String {
    let language = params
        .lang
        .as_deref()
        .unwrap_or_else(|| header_str(req, http::header::ACCEPT_LANGUAGE));

    let traits = ClientTraits {
        user_agent: header_str(req, http::header::USER_AGENT),
        language,
        screen: params.w.zip(params.h),
    };
    fingerprint(&traits, salt)
}

fn header_str(req: &HttpRequest, name: http::header::HeaderName) -> &str {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

const CLIENT_TRAITS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Checking QR code...</title>
</head>
<body>
<p>Checking QR code...</p>
<noscript><p><a href="?w=0&amp;h=0">Continue</a></p></noscript>
<script>
var params = new URLSearchParams({
  w: String(screen.width || 0),
  h: String(screen.height || 0),
  lang: navigator.language || ""
});
location.replace(location.pathname + "?" + params.toString());
</script>
</body>
</html>
"#;

fn render_outcome_page(outcome: ScanOutcome, redirect: Option<(&str, u64)>) -> String {
    let (refresh, note) = match redirect {
        Some((url, delay)) => {
            let url = escape_html(url);
            (
                format!(r#"<meta http-equiv="refresh" content="{delay};url={url}">"#),
                format!("<p>Redirecting to {url} in {delay} seconds...</p>"),
            )
        }
        None => (String::new(), String::new()),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<p>{message}</p>
{note}
</body>
</html>
"#,
        title = outcome.title(),
        message = outcome.message(),
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_page_redirects_after_delay() {
        let page = render_outcome_page(
            ScanOutcome::Success,
            Some(("http://example.com/?a=1&b=2", 3)),
        );
        assert!(page.contains(r#"content="3;url=http://example.com/?a=1&amp;b=2""#));
        assert!(page.contains("Success!"));
    }

    #[test]
    fn client_traits_page_reloads_with_screen_and_language() {
        assert!(CLIENT_TRAITS_PAGE.contains("screen.width"));
        assert!(CLIENT_TRAITS_PAGE.contains("screen.height"));
        assert!(CLIENT_TRAITS_PAGE.contains("navigator.language"));
        assert!(!CLIENT_TRAITS_PAGE.contains("http-equiv"));
    }

    #[test]
    fn failure_pages_do_not_redirect() {
        let page = render_outcome_page(ScanOutcome::Expired, None);
        assert!(!page.contains("http-equiv"));
        assert!(page.contains("only valid for 2 minutes"));
    }
}
