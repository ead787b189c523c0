use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::sync::CancellationToken;

use crate::cdp::BrowserEngine;
use crate::request::RenderRequest;

use super::spool::SpoolError;
use super::AppState;

const USAGE: &str = "printd: HTML to PDF

POST / with multipart/form-data:
  htmlFile  HTML document to render
  filename  name of a document already in the spool directory (used when no htmlFile is sent)
  width     page width in inches (default 8.5)
  height    page height in inches (default 11)
  delay     milliseconds to wait after the load event (default 300, at most render.max_settle_delay)

The response body is the PDF (first page only).

Example:
  curl -F htmlFile=@invoice.html -F width=8.5 -F height=11 http://localhost:8888/ -o invoice.pdf
";

pub(super) async fn usage() -> &'static str {
    USAGE
}

/// Fields read from the upload form.
#[derive(Debug, Default)]
struct PrintForm {
    upload: Option<(Vec<u8>, Option<String>)>,
    filename: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    delay_ms: Option<u64>,
    user_agent: Option<String>,
}

impl PrintForm {
    async fn read(mut multipart: Multipart) -> Result<Self, String> {
        let mut form = PrintForm::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "htmlFile" => {
                    let original = field.file_name().map(str::to_string);
                    let data = field.bytes().await.map_err(|e| e.body_text())?;
                    form.upload = Some((data.to_vec(), original));
                }
                "filename" => form.filename = non_empty(field.text().await.map_err(|e| e.body_text())?),
                "width" => form.width = parse_field(&name, field.text().await.map_err(|e| e.body_text())?)?,
                "height" => form.height = parse_field(&name, field.text().await.map_err(|e| e.body_text())?)?,
                "delay" => form.delay_ms = parse_field(&name, field.text().await.map_err(|e| e.body_text())?)?,
                "userAgent" => form.user_agent = non_empty(field.text().await.map_err(|e| e.body_text())?),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_field<T: std::str::FromStr>(name: &str, value: String) -> Result<Option<T>, String> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid {name}: {raw:?}")),
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    tracing::debug!(%message, "rejected print request");
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn render_failed() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "failed to render document").into_response()
}

pub(super) async fn print<E: BrowserEngine>(
    State(state): State<Arc<AppState<E>>>,
    multipart: Multipart,
) -> Response {
    let form = match PrintForm::read(multipart).await {
        Ok(form) => form,
        Err(message) => return bad_request(message),
    };

    let document = match (form.upload, form.filename.as_deref()) {
        (Some((data, original)), _) => state.spool().store(data, original.as_deref()).await,
        (None, Some(name)) => state.spool().claim(name),
        (None, None) => return bad_request("no htmlFile uploaded and no filename given"),
    };
    let document = match document {
        Ok(document) => document,
        Err(SpoolError::Io(e)) => {
            tracing::error!(error = %e, "failed to spool document");
            return render_failed();
        }
        Err(e) => return bad_request(e.to_string()),
    };
    let uri = match document.uri() {
        Ok(uri) => uri,
        Err(e) => return bad_request(e.to_string()),
    };

    let defaults = state.defaults();
    let request = RenderRequest::builder(uri)
        .width_inches(form.width.unwrap_or(defaults.paper.width_inches))
        .height_inches(form.height.unwrap_or(defaults.paper.height_inches))
        .settle_delay(form.delay_ms.map(Duration::from_millis).unwrap_or(defaults.settle_delay))
        .max_settle_delay(defaults.max_settle_delay)
        .user_agent(form.user_agent)
        .build();
    let request = match request {
        Ok(request) => request,
        Err(e) => return bad_request(e.to_string()),
    };

    // Dropping this handler (client went away) cancels the render.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let task_state = Arc::clone(&state);
    let render = tokio::spawn(async move {
        let outcome = task_state
            .pipeline()
            .render_with_cancel(&request, &cancel)
            .await;
        drop(document);
        outcome
    });

    match render.await {
        Ok(Ok(pdf)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/pdf")],
            pdf,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(kind = ?e.kind(), error = %e, "print request failed");
            render_failed()
        }
        Err(e) => {
            tracing::error!(error = %e, "render task aborted");
            render_failed()
        }
    }
}
