//! Server-rendered HTML.
//!
//! Every dynamic value goes through [`escape`]. Private screens are wrapped in
//! [`shell`], public ones are standalone documents.

pub mod screens;

use crate::routes::{LOGIN_PATH, Screen};
use std::fmt::Write as _;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#f4f8ff;color:#1a1a1a}\
header{display:flex;justify-content:space-between;align-items:center;padding:12px 24px;background:#013dc0;color:#fff}\
header form{margin:0}\
nav{width:200px;float:left;padding:16px}\
nav a{display:block;padding:6px 0;color:#013dc0;text-decoration:none}\
nav a.active{font-weight:bold}\
main{margin-left:232px;padding:24px}\
.standalone{max-width:420px;margin:64px auto;background:#fff;padding:32px;border-radius:24px}\
.notice{padding:8px 12px;border-radius:6px;margin-bottom:16px}\
.notice.success{background:#dcfce7;color:#166534}\
.notice.error{background:#fee2e2;color:#991b1b}\
.field{margin-bottom:12px}\
.field label{display:block;font-size:14px;margin-bottom:4px}\
.field input,.field select,.field textarea{width:100%;padding:8px;background:#e9f4ff;border:1px solid #ccc;border-radius:6px}\
.field .error{color:#dc2626;font-size:12px}";

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// A one-shot message shown above the screen content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    #[must_use]
    pub fn render(&self) -> String {
        let (class, message) = match self {
            Self::Success(message) => ("success", message),
            Self::Error(message) => ("error", message),
        };
        format!(
            r#"<div class="notice {class}" role="status">{}</div>"#,
            escape(message)
        )
    }
}

pub(crate) fn notice_html(notice: Option<&Notice>) -> String {
    notice.map(Notice::render).unwrap_or_default()
}

/// Full HTML document.
#[must_use]
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{} | Hospital Admin</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

/// Standalone page for the public screens.
#[must_use]
pub fn standalone(title: &str, content: &str) -> String {
    document(
        title,
        &format!(r#"<main class="standalone">{content}</main>"#),
    )
}

/// Layout shell around a private screen: header, navigation and logout.
#[must_use]
pub fn shell(
    navigation: &[(&'static str, Screen)],
    current: Screen,
    role: Option<&str>,
    content: &str,
) -> String {
    let mut nav = String::new();
    for (path, screen) in navigation {
        let class = if *screen == current {
            r#" class="active""#
        } else {
            ""
        };
        let _ = write!(
            nav,
            r#"<a href="{}"{class}>{}</a>"#,
            escape(path),
            escape(screen.title())
        );
    }

    let role = role
        .map(|role| format!(r#"<span class="role">{}</span> "#, escape(role)))
        .unwrap_or_default();

    let body = format!(
        r#"<header><strong>Hospital Admin</strong><div>{role}<form method="post" action="/logout"><button type="submit">Logout</button></form></div></header>
<nav>{nav}</nav>
<main>{content}</main>"#
    );
    document(current.title(), &body)
}

pub(crate) fn login_link() -> String {
    format!(r#"<a href="{LOGIN_PATH}">Back to login</a>"#)
}
