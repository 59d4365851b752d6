use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{ResponseLog, SheetRow};
use crate::errors::SheetError;
use crate::phone;

/// Google Apps Script web app that appends form-encoded rows to a sheet.
///
/// Apps Script answers a POST with a 302 to a one-off content URL; the
/// client follows it and only the final status is checked.
#[derive(Clone)]
pub struct AppsScriptLog {
    http: reqwest::Client,
    webapp_url: String,
}

impl AppsScriptLog {
    pub fn new(http: reqwest::Client, webapp_url: &str) -> Self {
        Self { http, webapp_url: webapp_url.to_string() }
    }
}

#[async_trait]
impl ResponseLog for AppsScriptLog {
    #[instrument(skip(self, row), fields(phone = %phone::mask(&row.phone)))]
    async fn append(&self, row: &SheetRow) -> Result<(), SheetError> {
        let resp = self
            .http
            .post(&self.webapp_url)
            .form(row)
            .send()
            .await
            .map_err(SheetError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SheetError::Status(status.as_u16()));
        }
        debug!(event = "sheet_append", status = status.as_u16(), "response row logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn row() -> SheetRow {
        SheetRow {
            phone: "501234567".into(),
            status: "Unsatisfied".into(),
            feedback: "late & cold".into(),
        }
    }

    #[tokio::test]
    async fn posts_form_encoded_row() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/exec")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("phone".into(), "501234567".into()),
                Matcher::UrlEncoded("status".into(), "Unsatisfied".into()),
                Matcher::UrlEncoded("feedback".into(), "late & cold".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let log = AppsScriptLog::new(reqwest::Client::new(), &format!("{}/exec", server.url()));
        log.append(&row()).await?;
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn follows_apps_script_redirect() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let echo = format!("{}/echo", server.url());
        let _exec = server
            .mock("POST", "/exec")
            .with_status(302)
            .with_header("location", echo.as_str())
            .create_async()
            .await;
        let landed = server
            .mock("GET", "/echo")
            .with_status(200)
            .with_body(r#"{"result":"success"}"#)
            .create_async()
            .await;

        let log = AppsScriptLog::new(reqwest::Client::new(), &format!("{}/exec", server.url()));
        log.append(&row()).await?;
        landed.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn non_success_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/exec").with_status(500).create_async().await;

        let log = AppsScriptLog::new(reqwest::Client::new(), &format!("{}/exec", server.url()));
        let err = log.append(&row()).await.unwrap_err();
        assert!(matches!(err, SheetError::Status(500)));
    }
}
