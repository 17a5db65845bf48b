//! 页面分类 - 业务能力层
//!
//! 判断提交后的页面是验证码、网站错误提示还是成绩表。
//! 验证码必须先于错误提示检查，部分验证码页面也会填充提示区域。

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{ClassifiedResponse, RawResultPage};

/// 成绩表元素 ID
pub const RESULT_TABLE_ID: &str = "ctl00_ContentPlaceHolder1_gvDetail";
/// 错误提示元素 ID
pub const MESSAGE_ID: &str = "ctl00_ContentPlaceHolder1_lblMsg";

static CAPTCHA_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#captcha").expect("静态选择器"));
static MESSAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(&format!("#{}", MESSAGE_ID)).expect("静态选择器"));
static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(&format!("table#{}", RESULT_TABLE_ID)).expect("静态选择器"));

/// 对页面进行分类
pub fn classify(page: &RawResultPage) -> ClassifiedResponse {
    let raw = page.as_str();
    let doc = Html::parse_document(raw);

    if doc.select(&CAPTCHA_SEL).next().is_some() || raw.to_lowercase().contains("captcha") {
        return ClassifiedResponse::CaptchaChallenge;
    }

    if let Some(message) = doc.select(&MESSAGE_SEL).next() {
        let text = message.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return ClassifiedResponse::ServerError(text);
        }
    }

    match doc.select(&TABLE_SEL).next() {
        Some(table) => ClassifiedResponse::ResultTable(table.html()),
        None => ClassifiedResponse::TableNotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> RawResultPage {
        RawResultPage::new(format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_captcha_wins_over_message() {
        let p = page(
            r#"<div id="captcha"></div>
               <span id="ctl00_ContentPlaceHolder1_lblMsg">Please verify</span>"#,
        );
        assert_eq!(classify(&p), ClassifiedResponse::CaptchaChallenge);
    }

    #[test]
    fn test_captcha_substring_any_case() {
        let p = page(r#"<img src="/GetCAPTCHAImage.ashx">"#);
        assert_eq!(classify(&p), ClassifiedResponse::CaptchaChallenge);
    }

    #[test]
    fn test_server_message() {
        let p = page(
            r#"<span id="ctl00_ContentPlaceHolder1_lblMsg">
                 Enrolment Number not found
               </span>"#,
        );
        assert_eq!(
            classify(&p),
            ClassifiedResponse::ServerError("Enrolment Number not found".into())
        );
    }

    #[test]
    fn test_blank_message_falls_through_to_table() {
        let p = page(
            r#"<span id="ctl00_ContentPlaceHolder1_lblMsg">   </span>
               <table id="ctl00_ContentPlaceHolder1_gvDetail"><tr><th>COURSE</th></tr></table>"#,
        );
        match classify(&p) {
            ClassifiedResponse::ResultTable(markup) => {
                assert!(markup.contains("ctl00_ContentPlaceHolder1_gvDetail"));
                assert!(markup.contains("COURSE"));
            }
            other => panic!("应该识别为成绩表: {:?}", other),
        }
    }

    #[test]
    fn test_table_not_found() {
        let p = page("<p>Welcome</p>");
        assert_eq!(classify(&p), ClassifiedResponse::TableNotFound);
    }
}
