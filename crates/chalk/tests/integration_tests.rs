use chalk::*;
use serial_test::serial;

#[test]
fn test_status_functions() {
  info("Fetching progress");
  warn("Insights unavailable");
  error("Could not connect to the server.");
  success("Logged in");
  stamped("Progress loaded");
}

#[test]
fn test_multiline_messages() {
  let multiline_msg = "First line\nSecond line\nThird line";
  info(multiline_msg);
  warn(multiline_msg);
  error(multiline_msg);
  success(multiline_msg);
}

#[test]
#[serial]
fn test_init_tracing_is_idempotent() {
  std::env::set_var(LOG_ENV, "mentor=debug");
  init_tracing(false);
  init_tracing(true);
  std::env::remove_var(LOG_ENV);
  tracing::warn!("still logging after repeated init");
}

#[test]
fn test_draw_is_reexported_as_module() {
  assert_eq!(draw::bar(1.0, 2.0, 2), "█░");
  assert!(draw::gauge(100.0, 2).ends_with("100.0%"));
}
