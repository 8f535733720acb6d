//! Landing page rendering.

use crate::target::Target;

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Web UI Proxy</title>
    <style>
      body { font-family: Arial, sans-serif; padding: 20px; }
      ul { padding-left: 20px; }
      a { text-decoration: none; }
    </style>
  </head>
  <body>
    <h1>Web UI Proxy</h1>
"#;

const PAGE_FOOT: &str = "
  </body>
</html>
";

/// Render the landing page: one slot link per target, or a hint when no
/// devices are configured yet.
pub fn render(targets: &[Target]) -> String {
    let mut page = String::from(PAGE_HEAD);

    if targets.is_empty() {
        page.push_str("    <p>No devices configured. Add targets in the add-on options.</p>");
    } else {
        page.push_str("    <ul>\n");
        for (idx, target) in targets.iter().enumerate() {
            page.push_str(&format!(
                "      <li><a href=\"proxy/{}/\">{}</a></li>\n",
                idx + 1,
                escape(&target.name)
            ));
        }
        page.push_str("    </ul>");
    }

    page.push_str(PAGE_FOOT);
    page
}

/// Minimal HTML escaping for text and attribute contexts.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawTarget;

    fn target(name: &str, url: &str) -> Target {
        Target::parse(&RawTarget::Entry {
            name: name.to_string(),
            url: url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_empty_list_renders_configure_hint() {
        let page = render(&[]);
        assert!(page.contains("No devices configured"));
        assert!(!page.contains("<li>"));
    }

    #[test]
    fn test_links_follow_slot_order() {
        let page = render(&[target("NAS", "192.168.1.20:8443"), target("Router", "10.0.0.1")]);

        let nas = page.find(r#"<a href="proxy/1/">NAS</a>"#).unwrap();
        let router = page.find(r#"<a href="proxy/2/">Router</a>"#).unwrap();
        assert!(nas < router);
    }

    #[test]
    fn test_name_is_html_escaped() {
        let page = render(&[target("Cam <\"backyard\"> & shed", "10.0.0.7")]);
        assert!(page.contains("Cam &lt;&quot;backyard&quot;&gt; &amp; shed"));
        assert!(!page.contains("<\"backyard\">"));
    }

    #[test]
    fn test_default_name_is_host_port() {
        let page = render(&[Target::parse(&RawTarget::Bare("10.0.0.5".to_string())).unwrap()]);
        assert!(page.contains(">10.0.0.5:80</a>"));
    }
}
