//! Gateway configuration rendering.
//!
//! Pure function of the ordered target list: same input, byte-identical
//! document. Slot numbers are the 1-based positions in the list; reordering
//! targets therefore changes every generated route.

use crate::rewrite::{self, BODY_REWRITE_RULES, REWRITE_CONTENT_TYPES};
use crate::target::{Scheme, Target};

/// Slot-prefixed routes cover the backend's own markup after rewriting, but
/// some apps fetch shared assets and API endpoints by absolute path from
/// code the rewriter cannot see. These prefixes are proxied by referer
/// lookup instead.
const SHARED_ROUTES: [&str; 6] = ["/api/", "/rpc/", "/ws/", "/scripts/", "/fonts/", "/icons/"];

const CONF_HEAD: &str = r#"worker_processes 1;

pid /run/nginx/nginx.pid;

error_log /var/log/nginx/error.log warn;

events {
    worker_connections 1024;
}

http {
    include /etc/nginx/mime.types;
    default_type application/octet-stream;

    sendfile on;
    keepalive_timeout 65;

    map $http_upgrade $connection_upgrade {
        default upgrade;
        '' close;
    }

"#;

const SERVER_HEAD: &str = r#"    server {
        listen 8080;
        server_name _;

        root /app/html;
        index index.html;

        location = / {
            try_files /index.html =404;
        }
"#;

/// Render the complete nginx document. Valid for the gateway to load even
/// with zero targets (landing page only, no proxy routes).
pub fn render(targets: &[Target]) -> String {
    let mut conf = String::with_capacity(4096 + targets.len() * 4096);

    conf.push_str(CONF_HEAD);
    push_referer_maps(&mut conf, targets);
    conf.push_str(SERVER_HEAD);

    if !targets.is_empty() {
        for route in SHARED_ROUTES {
            push_shared_location(&mut conf, route);
        }
    }

    for (idx, target) in targets.iter().enumerate() {
        push_slot_location(&mut conf, idx + 1, target);
    }

    conf.push_str("    }\n}\n");
    conf
}

/// Two referer-keyed lookup tables: slot to `scheme://host:port` for
/// proxy_pass and slot to `host:port` for the Host header. A request whose
/// referer matches no slot resolves to "" and the shared routes answer 404
/// instead of proxying to an arbitrary backend.
fn push_referer_maps(conf: &mut String, targets: &[Target]) {
    conf.push_str("    map $http_referer $slot_upstream {\n        default \"\";\n");
    for (idx, target) in targets.iter().enumerate() {
        conf.push_str(&format!(
            "        ~*/proxy/{}/ {};\n",
            idx + 1,
            target.upstream()
        ));
    }
    conf.push_str("    }\n\n");

    conf.push_str("    map $http_referer $slot_host {\n        default \"\";\n");
    for (idx, target) in targets.iter().enumerate() {
        conf.push_str(&format!(
            "        ~*/proxy/{}/ {};\n",
            idx + 1,
            target.host_port()
        ));
    }
    conf.push_str("    }\n\n");
}

fn push_shared_location(conf: &mut String, route: &str) {
    conf.push_str(&format!(
        r#"
        location {route} {{
            if ($slot_upstream = "") {{
                return 404;
            }}
            proxy_http_version 1.1;
            proxy_set_header Upgrade $http_upgrade;
            proxy_set_header Connection $connection_upgrade;
            proxy_set_header Host $slot_host;
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
            proxy_ssl_server_name on;
            proxy_ssl_verify off;
            proxy_pass $slot_upstream;
        }}
"#,
        route = route
    ));
}

fn push_slot_location(conf: &mut String, slot: usize, target: &Target) {
    let prefix = format!("$http_x_ingress_path/proxy/{}", slot);

    conf.push_str(&format!(
        r#"
        location /proxy/{slot}/ {{
            proxy_http_version 1.1;
            proxy_set_header Upgrade $http_upgrade;
            proxy_set_header Connection $connection_upgrade;
            proxy_set_header Host {host_port};
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
            proxy_set_header X-Forwarded-Proto $scheme;
            proxy_set_header X-Forwarded-Prefix {prefix};
            proxy_set_header Accept-Encoding "";
            proxy_read_timeout 3600s;
            proxy_send_timeout 3600s;
            proxy_buffering off;
            proxy_redirect ~^(https?://[^/]+)?(/.*)$ {prefix}$2;
            proxy_cookie_path / {prefix}/;
            sub_filter_once off;
            sub_filter_types {types};
"#,
        slot = slot,
        host_port = target.host_port(),
        prefix = prefix,
        types = REWRITE_CONTENT_TYPES,
    ));

    for rule in BODY_REWRITE_RULES {
        conf.push_str(&format!(
            "            sub_filter {} {};\n",
            nginx_quote(rule.pattern),
            nginx_quote(&rule.replacement.replace("{prefix}", &prefix)),
        ));
    }
    conf.push_str(&format!(
        "            sub_filter '<head>' {};\n",
        nginx_quote(&rewrite::head_injection().replace("{prefix}", &prefix)),
    ));

    if target.scheme == Scheme::Https {
        // Local devices ship self-signed certificates; send SNI but skip
        // verification on the trusted network.
        conf.push_str("            proxy_ssl_server_name on;\n");
        conf.push_str("            proxy_ssl_verify off;\n");
    }

    conf.push_str(&format!(
        "            rewrite ^/proxy/{slot}/(.*)$ /$1 break;\n            proxy_pass {upstream}/;\n        }}\n",
        slot = slot,
        upstream = target.upstream(),
    ));
}

/// Quote a value for the nginx config: single quotes unless the value
/// itself contains one. Values never mix both quote styles.
fn nginx_quote(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value)
    }
}
