//! Ordered response-body rewrite rules for slot-prefixed proxying.
//!
//! Backends know nothing about the slot prefix, so every root-relative
//! reference they emit would escape it. The table below drives the generated
//! `sub_filter` directives; `{prefix}` in a replacement expands to the
//! ingress-aware slot prefix (`$http_x_ingress_path/proxy/{slot}`) at render
//! time. The table order is the evaluation order written into the gateway
//! document: a pattern that extends another pattern must sort before it.
//!
//! Version history:
//!   1 - attribute and url() forms plus /api/ (the original inline set)
//!   2 - adds the /rpc/, /ws/, /scripts/, /assets/, /static/, /fonts/ and
//!       /icons/ sub-path families
pub const RULES_VERSION: u32 = 2;

/// One literal substring rewrite applied to proxied response bodies.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub pattern: &'static str,
    /// Replacement template; `{prefix}` expands to the slot prefix.
    pub replacement: &'static str,
}

const fn rule(pattern: &'static str, replacement: &'static str) -> RewriteRule {
    RewriteRule {
        pattern,
        replacement,
    }
}

/// The body-rewrite table, in evaluation order.
pub const BODY_REWRITE_RULES: &[RewriteRule] = &[
    // Root-relative markup attributes, double then single quoted.
    rule("href=\"/", "href=\"{prefix}/"),
    rule("src=\"/", "src=\"{prefix}/"),
    rule("action=\"/", "action=\"{prefix}/"),
    rule("href='/", "href='{prefix}/"),
    rule("src='/", "src='{prefix}/"),
    rule("action='/", "action='{prefix}/"),
    // CSS url() forms; the quoted variants differ at the quote character,
    // the bare form catches unquoted stylesheets.
    rule("url(\"/", "url(\"{prefix}/"),
    rule("url('/", "url('{prefix}/"),
    rule("url(/", "url({prefix}/"),
    // Sub-path families that show up in inline script string literals.
    rule("\"/api/", "\"{prefix}/api/"),
    rule("'/api/", "'{prefix}/api/"),
    rule("\"/rpc/", "\"{prefix}/rpc/"),
    rule("'/rpc/", "'{prefix}/rpc/"),
    rule("\"/ws/", "\"{prefix}/ws/"),
    rule("'/ws/", "'{prefix}/ws/"),
    rule("\"/scripts/", "\"{prefix}/scripts/"),
    rule("'/scripts/", "'{prefix}/scripts/"),
    rule("\"/assets/", "\"{prefix}/assets/"),
    rule("'/assets/", "'{prefix}/assets/"),
    rule("\"/static/", "\"{prefix}/static/"),
    rule("'/static/", "'{prefix}/static/"),
    rule("\"/fonts/", "\"{prefix}/fonts/"),
    rule("'/fonts/", "'{prefix}/fonts/"),
    rule("\"/icons/", "\"{prefix}/icons/"),
    rule("'/icons/", "'{prefix}/icons/"),
];

/// Response content types the rewrite rules apply to.
pub const REWRITE_CONTENT_TYPES: &str = "text/html text/css application/javascript application/json";

/// Client-side shim injected after `<head>` together with the `<base>` tag.
///
/// Static substitution cannot reach URLs that client code assembles at
/// runtime, so this patches `fetch`, `XMLHttpRequest.open`, the `WebSocket`
/// constructor and attribute setters to pull absolute same-origin,
/// protocol-relative and same-host ws/wss URLs back under the slot prefix
/// (derived from the injected `<base>` tag).
///
/// The script travels inside a single-quoted nginx `sub_filter` replacement,
/// so it must stay on one line and use only double quotes, with no literal
/// `$` anywhere (nginx would read it as a variable reference).
pub const CLIENT_SHIM: &str = concat!(
    "(function(){",
    "var base=document.querySelector(\"base\");if(!base)return;",
    "var prefix=new URL(base.href).pathname;",
    "if(prefix.slice(-1)===\"/\")prefix=prefix.slice(0,-1);",
    "if(!prefix)return;",
    "function reroute(u){",
    "if(typeof u!==\"string\"||!u)return u;",
    "if(u.slice(0,2)===\"//\")u=location.protocol+u;",
    "var sep=u.indexOf(\"://\");",
    "if(sep>0){",
    "var scheme=u.slice(0,sep);",
    "if(scheme!==\"http\"&&scheme!==\"https\"&&scheme!==\"ws\"&&scheme!==\"wss\")return u;",
    "var rest=u.slice(sep+3);",
    "var cut=rest.indexOf(\"/\");",
    "var host=cut<0?rest:rest.slice(0,cut);",
    "var path=cut<0?\"/\":rest.slice(cut);",
    "if(host!==location.host)return u;",
    "if(path.indexOf(prefix+\"/\")===0)return u;",
    "return scheme+\"://\"+host+prefix+path",
    "}",
    "if(u.charAt(0)===\"/\"&&u.indexOf(prefix+\"/\")!==0)return prefix+u;",
    "return u",
    "}",
    "var origFetch=window.fetch;",
    "if(origFetch)window.fetch=function(input,init){",
    "if(typeof input===\"string\")input=reroute(input);",
    "return origFetch.call(this,input,init)",
    "};",
    "var origOpen=XMLHttpRequest.prototype.open;",
    "XMLHttpRequest.prototype.open=function(){",
    "arguments[1]=reroute(arguments[1]);",
    "return origOpen.apply(this,arguments)",
    "};",
    "var OrigWS=window.WebSocket;",
    "if(OrigWS){",
    "window.WebSocket=function(u,protocols){",
    "u=reroute(u);",
    "return protocols===undefined?new OrigWS(u):new OrigWS(u,protocols)",
    "};",
    "window.WebSocket.prototype=OrigWS.prototype",
    "}",
    "var origSet=Element.prototype.setAttribute;",
    "Element.prototype.setAttribute=function(attr,value){",
    "if(attr===\"href\"||attr===\"src\"||attr===\"action\")value=reroute(value);",
    "return origSet.call(this,attr,value)",
    "}",
    "})();"
);

/// Replacement for the `<head>` tag: the `<base>` anchoring relative URLs
/// under the slot prefix plus the runtime shim. `{prefix}` expands like the
/// table replacements.
pub fn head_injection() -> String {
    format!(
        "<head><base href=\"{{prefix}}/\"><script>{}</script>",
        CLIENT_SHIM
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extending_patterns_sort_first() {
        for (i, outer) in BODY_REWRITE_RULES.iter().enumerate() {
            for (j, inner) in BODY_REWRITE_RULES.iter().enumerate() {
                if i == j {
                    continue;
                }
                if outer.pattern.starts_with(inner.pattern) {
                    assert!(
                        i < j,
                        "rule '{}' extends '{}' and must come first",
                        outer.pattern,
                        inner.pattern
                    );
                }
            }
        }
    }

    #[test]
    fn test_every_replacement_keeps_the_prefix_placeholder() {
        for rule in BODY_REWRITE_RULES {
            assert!(
                rule.replacement.contains("{prefix}"),
                "rule '{}' lacks a prefix placeholder",
                rule.pattern
            );
            // The replacement is the pattern with the prefix spliced in
            // front of the root slash.
            let expected = rule
                .pattern
                .strip_suffix('/')
                .map(|head| format!("{}{{prefix}}/", head))
                .unwrap();
            assert_eq!(rule.replacement, expected);
        }
    }

    #[test]
    fn test_patterns_use_exactly_one_quote_style() {
        for rule in BODY_REWRITE_RULES {
            assert!(
                !(rule.pattern.contains('\'') && rule.pattern.contains('"')),
                "rule '{}' mixes quote styles",
                rule.pattern
            );
        }
    }

    #[test]
    fn test_shim_survives_nginx_quoting() {
        assert!(!CLIENT_SHIM.contains('\''), "shim must avoid single quotes");
        assert!(!CLIENT_SHIM.contains('\n'), "shim must stay on one line");
        assert!(!CLIENT_SHIM.contains('$'), "nginx would expand a literal $");
        assert!(!CLIENT_SHIM.contains('\\'), "shim must avoid escapes");
    }

    #[test]
    fn test_head_injection_carries_base_and_shim() {
        let injection = head_injection();
        assert!(injection.starts_with("<head><base href=\"{prefix}/\">"));
        assert!(injection.contains("<script>"));
        assert!(injection.contains(CLIENT_SHIM));
    }
}
