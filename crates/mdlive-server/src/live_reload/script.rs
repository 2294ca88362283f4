//! Browser-side bootstrap block.

/// Bootstrap block appended to every document response when live reload is
/// enabled. `{port}` is substituted with the serving port.
const BOOTSTRAP_TEMPLATE: &str = r#"
<script>
let socket = new WebSocket("ws://" + location.hostname + ":{port}/ws");

socket.onmessage = function (event) {
    if (event.data === "reload") {
        location.reload();
    }
};

socket.onerror = function (event) {
    console.error("WebSocket error observed:", event);
};

socket.onclose = function (event) {
    if (!event.wasClean) {
        console.error("Live reload connection died");
    }
};
</script>
"#;

/// Render the bootstrap script for the given serving port.
pub(crate) fn bootstrap_script(port: u16) -> String {
    BOOTSTRAP_TEMPLATE.replace("{port}", &port.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_targets_ws_route_on_port() {
        let script = bootstrap_script(4321);

        assert!(script.contains(":4321/ws"));
        assert!(!script.contains("{port}"));
    }

    #[test]
    fn test_script_reloads_on_exact_payload() {
        let script = bootstrap_script(8080);

        assert!(script.contains(r#"event.data === "reload""#));
        assert!(script.contains("location.reload()"));
    }
}
