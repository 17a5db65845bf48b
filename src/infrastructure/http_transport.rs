//! reqwest 表单会话 - 基础设施层
//!
//! 不执行脚本，直接按页面表单提交（含 ASP.NET 的 __doPostBack 回发）。
//! 返回的页面是静态 HTML，控件要么存在要么不存在，不需要轮询等待。

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::DriverFailure;
use crate::infrastructure::transport::{FieldHandle, Transport, TransportProvider};

static ID_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[id]").expect("静态选择器"));
static FORM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").expect("静态选择器"));
static CONTROL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name], select[name], textarea[name]").expect("静态选择器"));
static OPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").expect("静态选择器"));
static POSTBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__doPostBack\(\\?'([^'\\]*)\\?'").expect("静态正则"));

/// HTTP 会话工厂
pub struct HttpProvider {
    request_timeout: Duration,
}

impl HttpProvider {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

#[async_trait]
impl TransportProvider for HttpProvider {
    async fn open(&self) -> Result<Box<dyn Transport>, DriverFailure> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(self.request_timeout)
            .user_agent(concat!("gradecard_calculator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DriverFailure::init_failed)?;
        Ok(Box::new(HttpTransport {
            client,
            current_url: None,
            html: String::new(),
            overrides: Vec::new(),
        }))
    }
}

/// 单个 HTTP 会话（独立的 cookie 存储）
pub struct HttpTransport {
    client: Client,
    current_url: Option<Url>,
    html: String,
    /// 已填写的表单值（按 name）
    overrides: Vec<(String, String)>,
}

/// 页面控件信息
#[derive(Debug, Clone, PartialEq)]
struct FieldInfo {
    name: String,
    value: String,
    disabled: bool,
    hidden: bool,
    options: Option<Vec<String>>,
    postback_target: Option<String>,
}

/// 当前表单内容
#[derive(Debug, Clone, PartialEq)]
struct FormSnapshot {
    action: String,
    fields: Vec<(String, String)>,
}

fn find_by_id<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    doc.select(&ID_SEL).find(|el| el.value().id() == Some(id))
}

fn option_value(option: ElementRef<'_>) -> String {
    option
        .value()
        .attr("value")
        .map(str::to_string)
        .unwrap_or_else(|| option.text().collect::<String>().trim().to_string())
}

fn inspect_field(html: &str, id: &str) -> Option<FieldInfo> {
    let doc = Html::parse_document(html);
    let el = find_by_id(&doc, id)?;
    let attrs = el.value();
    let is_select = attrs.name() == "select";
    let style = attrs.attr("style").unwrap_or("").replace(' ', "").to_lowercase();

    Some(FieldInfo {
        name: attrs.attr("name").unwrap_or(id).to_string(),
        value: attrs.attr("value").unwrap_or("").to_string(),
        disabled: attrs.attr("disabled").is_some(),
        hidden: attrs.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
            || style.contains("display:none")
            || style.contains("visibility:hidden"),
        options: is_select.then(|| el.select(&OPTION_SEL).map(option_value).collect()),
        postback_target: attrs
            .attr("onchange")
            .and_then(|js| POSTBACK_RE.captures(js))
            .map(|caps| caps[1].to_string()),
    })
}

fn control_value(el: ElementRef<'_>) -> Option<String> {
    let attrs = el.value();
    match attrs.name() {
        "select" => {
            let mut options = el.select(&OPTION_SEL);
            let selected = el
                .select(&OPTION_SEL)
                .find(|o| o.value().attr("selected").is_some());
            selected.or_else(|| options.next()).map(option_value)
        }
        "textarea" => Some(el.text().collect()),
        _ => {
            let kind = attrs.attr("type").unwrap_or("text").to_ascii_lowercase();
            match kind.as_str() {
                "submit" | "button" | "image" | "reset" | "file" => None,
                "checkbox" | "radio" => attrs
                    .attr("checked")
                    .map(|_| attrs.attr("value").unwrap_or("on").to_string()),
                _ => Some(attrs.attr("value").unwrap_or("").to_string()),
            }
        }
    }
}

fn snapshot_form(html: &str) -> FormSnapshot {
    let doc = Html::parse_document(html);
    let form = doc.select(&FORM_SEL).next();
    let controls: Vec<ElementRef<'_>> = match form {
        Some(form) => form.select(&CONTROL_SEL).collect(),
        None => doc.select(&CONTROL_SEL).collect(),
    };

    let fields = controls
        .into_iter()
        .filter(|el| el.value().attr("disabled").is_none())
        .filter_map(|el| {
            let name = el.value().attr("name")?.to_string();
            control_value(el).map(|value| (name, value))
        })
        .collect();

    FormSnapshot {
        action: form
            .and_then(|f| f.value().attr("action"))
            .unwrap_or("")
            .to_string(),
        fields,
    }
}

fn first_present(html: &str, ids: &[&str]) -> Option<String> {
    let doc = Html::parse_document(html);
    ids.iter()
        .find(|id| find_by_id(&doc, id).is_some())
        .map(|id| id.to_string())
}

/// 把已填写的值和额外字段合并进表单
fn merge_fields(
    mut fields: Vec<(String, String)>,
    overrides: &[(String, String)],
    extra: &[(String, String)],
) -> Vec<(String, String)> {
    for (name, value) in overrides {
        if let Some(slot) = fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.clone();
        }
    }
    for (name, value) in extra {
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.clone(),
            None => fields.push((name.clone(), value.clone())),
        }
    }
    fields
}

impl HttpTransport {
    fn field(&self, id: &str) -> Result<FieldInfo, DriverFailure> {
        inspect_field(&self.html, id).ok_or_else(|| DriverFailure::element_unavailable(id))
    }

    async fn post_form(&mut self, extra: Vec<(String, String)>) -> Result<(), DriverFailure> {
        let base = self
            .current_url
            .clone()
            .ok_or_else(|| DriverFailure::protocol("尚未打开页面"))?;
        let snapshot = snapshot_form(&self.html);
        let action = base
            .join(&snapshot.action)
            .map_err(DriverFailure::protocol)?;
        let fields = merge_fields(snapshot.fields, &self.overrides, &extra);
        debug!("提交表单到 {} ({} 个字段)", action, fields.len());

        let response = self
            .client
            .post(action)
            .form(&fields)
            .send()
            .await?
            .error_for_status()?;
        self.current_url = Some(response.url().clone());
        self.html = response.text().await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverFailure> {
        let url = Url::parse(url).map_err(DriverFailure::init_failed)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        self.current_url = Some(response.url().clone());
        self.html = response.text().await?;
        self.overrides.clear();
        Ok(())
    }

    async fn locate(
        &mut self,
        field_id: &str,
        _timeout: Duration,
        require_interactive: bool,
    ) -> Result<FieldHandle, DriverFailure> {
        let info = self.field(field_id)?;
        if require_interactive && (info.disabled || info.hidden) {
            return Err(DriverFailure::element_unavailable(field_id));
        }
        Ok(FieldHandle::new(field_id))
    }

    async fn set_value(&mut self, field: &FieldHandle, value: &str) -> Result<(), DriverFailure> {
        let info = self.field(field.id())?;
        if let Some(options) = &info.options {
            if !options.iter().any(|o| o == value) {
                debug!("{} 中没有选项 {}", field.id(), value);
                return Err(DriverFailure::element_unavailable(field.id()));
            }
        }

        match self.overrides.iter_mut().find(|(n, _)| n == &info.name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.overrides.push((info.name.clone(), value.to_string())),
        }

        // 下拉框带自动回发时，服务端会刷新后续选项
        if let Some(target) = info.postback_target {
            debug!("{} 触发回发: {}", field.id(), target);
            self.post_form(vec![
                ("__EVENTTARGET".to_string(), target),
                ("__EVENTARGUMENT".to_string(), String::new()),
            ])
            .await?;
        }
        Ok(())
    }

    async fn click(&mut self, control: &FieldHandle) -> Result<(), DriverFailure> {
        let info = self.field(control.id())?;
        self.post_form(vec![
            ("__EVENTTARGET".to_string(), String::new()),
            ("__EVENTARGUMENT".to_string(), String::new()),
            (info.name, info.value),
        ])
        .await
    }

    async fn wait_for_any(
        &mut self,
        element_ids: &[&str],
        timeout: Duration,
    ) -> Result<String, DriverFailure> {
        first_present(&self.html, element_ids).ok_or_else(|| DriverFailure::timeout(timeout))
    }

    async fn read_markup(&mut self) -> Result<String, DriverFailure> {
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> Result<(), DriverFailure> {
        self.html.clear();
        self.overrides.clear();
        self.current_url = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = r#"
        <html><body>
        <form method="post" action="./Default.aspx" id="form1">
            <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="abc" />
            <input type="hidden" name="__EVENTTARGET" id="__EVENTTARGET" value="" />
            <select name="ddlGradecardfor" id="ddlGradecardfor"
                    onchange="javascript:setTimeout('__doPostBack(\'ddlGradecardfor\',\'\')', 0)">
                <option value="0">--Select--</option>
                <option selected="selected" value="1">BCA/MCA/MP/PGDCA etc.</option>
            </select>
            <select name="ddlProgram" id="ddlProgram">
                <option value="MCA">MCA</option>
                <option value="MCAOL">MCAOL</option>
            </select>
            <input name="txtEnrno" type="text" id="txtEnrno" />
            <input type="submit" name="btnlogin" value="Submit" id="btnlogin" />
            <input type="text" name="txtOld" id="txtOld" disabled="disabled" value="x" />
        </form>
        </body></html>"#;

    #[test]
    fn test_inspect_select_with_postback() {
        let info = inspect_field(FORM, "ddlGradecardfor").unwrap();
        assert_eq!(info.name, "ddlGradecardfor");
        assert_eq!(info.postback_target.as_deref(), Some("ddlGradecardfor"));
        assert_eq!(info.options, Some(vec!["0".to_string(), "1".to_string()]));
        assert!(!info.disabled);

        let program = inspect_field(FORM, "ddlProgram").unwrap();
        assert_eq!(program.postback_target, None);
        assert!(inspect_field(FORM, "missing").is_none());
        assert!(inspect_field(FORM, "txtOld").unwrap().disabled);
        assert!(inspect_field(FORM, "__VIEWSTATE").unwrap().hidden);
    }

    #[test]
    fn test_snapshot_collects_form_state() {
        let snapshot = snapshot_form(FORM);
        assert_eq!(snapshot.action, "./Default.aspx");
        assert_eq!(
            snapshot.fields,
            vec![
                ("__VIEWSTATE".to_string(), "abc".to_string()),
                ("__EVENTTARGET".to_string(), String::new()),
                ("ddlGradecardfor".to_string(), "1".to_string()),
                ("ddlProgram".to_string(), "MCA".to_string()),
                ("txtEnrno".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_merge_fields() {
        let fields = snapshot_form(FORM).fields;
        let merged = merge_fields(
            fields,
            &[
                ("txtEnrno".to_string(), "123456789".to_string()),
                ("gone".to_string(), "ignored".to_string()),
            ],
            &[("btnlogin".to_string(), "Submit".to_string())],
        );
        assert!(merged.contains(&("txtEnrno".to_string(), "123456789".to_string())));
        assert!(merged.contains(&("btnlogin".to_string(), "Submit".to_string())));
        assert!(!merged.iter().any(|(n, _)| n == "gone"));
    }

    #[test]
    fn test_first_present() {
        let html = r#"<span id="ctl00_ContentPlaceHolder1_lblMsg">x</span>"#;
        assert_eq!(
            first_present(html, &["ctl00_ContentPlaceHolder1_gvDetail", "ctl00_ContentPlaceHolder1_lblMsg"]),
            Some("ctl00_ContentPlaceHolder1_lblMsg".to_string())
        );
        assert_eq!(first_present(html, &["nothing"]), None);
    }
}
