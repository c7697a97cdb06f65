//! HTML rendering: `{{key}}` substitution and the page layout.

use axum::response::Html;

/// A substitution value. `Text` is escaped, `Html` is inserted as is.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
  Text(&'a str),
  Html(&'a str),
}

/// Replace each `{{key}}` in `template`, in the order given.
///
/// Escaped text has its braces encoded, so a value can never introduce a
/// placeholder for a later key. Unknown placeholders are left in place.
pub fn render(template: &str, substitutions: &[(&str, Fragment<'_>)]) -> String {
  let mut out = template.to_owned();
  for (key, value) in substitutions {
    let placeholder = format!("{{{{{key}}}}}");
    let value = match value {
      Fragment::Text(s) => escape(s),
      Fragment::Html(s) => (*s).to_owned(),
    };
    out = out.replace(&placeholder, &value);
  }
  out
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      '{' => out.push_str("&#123;"),
      '}' => out.push_str("&#125;"),
      c => out.push(c),
    }
  }
  out
}

/// `<ul>` of escaped messages, or nothing for an empty slice.
pub fn error_list(messages: &[&str]) -> String {
  if messages.is_empty() {
    return String::new();
  }
  let items: String = messages
    .iter()
    .map(|m| format!("<li>{}</li>", escape(m)))
    .collect();
  format!(r#"<ul class="errors">{items}</ul>"#)
}

const LAYOUT: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{title}}</title></head>
<body>
<h1>{{title}}</h1>
{{body}}
</body>
</html>
"#;

/// Wrap an already-rendered body in the site layout.
pub fn page(title: &str, body: &str) -> Html<String> {
  Html(render(LAYOUT, &[
    ("title", Fragment::Text(title)),
    ("body", Fragment::Html(body)),
  ]))
}

pub const NOT_FOUND: &str = "<p>There is nothing here.</p>";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_is_escaped() {
    let out = render("<p>{{name}}</p>", &[("name", Fragment::Text(r#"<b>"x" & 'y'</b>"#))]);
    assert_eq!(out, "<p>&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;</p>");
  }

  #[test]
  fn html_fragments_are_inserted_verbatim() {
    let out = render("<div>{{inner}}</div>", &[("inner", Fragment::Html("<em>hi</em>"))]);
    assert_eq!(out, "<div><em>hi</em></div>");
  }

  #[test]
  fn every_occurrence_is_replaced() {
    let out = render("{{a}}-{{a}}", &[("a", Fragment::Text("x"))]);
    assert_eq!(out, "x-x");
  }

  #[test]
  fn values_cannot_smuggle_placeholders() {
    let out = render("{{first}} {{second}}", &[
      ("first", Fragment::Text("{{second}}")),
      ("second", Fragment::Text("boom")),
    ]);
    assert_eq!(out, "&#123;&#123;second&#125;&#125; boom");
  }

  #[test]
  fn unknown_placeholders_survive() {
    assert_eq!(render("{{missing}}", &[]), "{{missing}}");
  }

  #[test]
  fn error_list_escapes_items() {
    assert_eq!(error_list(&[]), "");
    assert_eq!(error_list(&["a<b"]), r#"<ul class="errors"><li>a&lt;b</li></ul>"#);
  }
}
