//! The `slfsrv-core.js` script that connects a served page to its host.

use crate::session::ServerContext;
use serde_json::Value;

/// Renders the bootstrap script for this session.
///
/// The page gets `window.slfsrv` with session facts, a `call(name, timeoutSeconds,
/// data)` helper returning a promise of the decoded reply, and a keepalive loop
/// started on load that pings the host three times per window.
pub fn render(context: &ServerContext) -> String {
    let session = &context.session;
    let secret = session.path_secret().unwrap_or_default();
    let interval_ms = (context.keep_alive.as_millis() / 3).max(1);

    format!(
        r#"(function () {{
  "use strict";
  var secretKey = {secret};
  var callBase = secretKey ? "/call/" + secretKey + "/" : "/call/";

  function call(name, timeoutSeconds, data) {{
    return fetch(callBase + encodeURIComponent(name) + "/" + (timeoutSeconds | 0), {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify(data === undefined ? {{}} : data)
    }}).then(function (response) {{
      if (!response.ok) {{
        throw new Error("slfsrv call " + name + " failed with status " + response.status);
      }}
      return response.json();
    }});
  }}

  function keepalive() {{
    call("keepalive", 1).catch(function () {{}});
  }}

  window.slfsrv = {{
    secretKey: secretKey,
    os: {os},
    port: {port},
    rootPath: {root_path},
    initFile: {init_file},
    self: {executable},
    call: call
  }};

  keepalive();
  setInterval(keepalive, {interval_ms});
}})();
"#,
        secret = js_string(secret),
        os = js_string(std::env::consts::OS),
        port = context.port,
        root_path = js_string(&session.root_path.to_string_lossy()),
        init_file = js_string(&session.init_file),
        executable = js_string(&context.executable.to_string_lossy()),
        interval_ms = interval_ms,
    )
}

/// A JSON string literal, which is also a valid JavaScript string literal.
fn js_string(value: &str) -> String {
    // `</` would close an enclosing inline <script> element.
    Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}
