use omp_xml::{ROOT, Status, XmlError, parse};

// ── Synthetic root ────────────────────────────────────────────────────────────

#[test]
fn sibling_top_level_elements_share_the_synthetic_root() {
    let raw = br#"<authenticate_response status="200" status_text="OK"/><help_response status="200">usage text</help_response>"#;
    let root = parse(raw).unwrap();

    assert_eq!(root.name(), ROOT);
    let names: Vec<_> = root.children().map(|c| c.name()).collect();
    assert_eq!(names, ["authenticate_response", "help_response"]);
    assert_eq!(root.require_text("help_response").unwrap(), "usage text");
}

#[test]
fn empty_input_is_an_empty_root() {
    let root = parse(b"").unwrap();
    assert_eq!(root.children().count(), 0);
    assert!(matches!(root.require("authenticate_response"), Err(XmlError::MissingElement(_))));
}

#[test]
fn unclosed_element_is_rejected() {
    assert!(parse(b"<get_tasks_response status=\"200\"><task>").is_err());
}

#[test]
fn stray_closing_tag_is_rejected() {
    assert!(parse(b"<a/></b>").is_err());
}

#[test]
fn invalid_utf8_is_rejected() {
    assert!(matches!(parse(b"<a>\xff\xfe</a>"), Err(XmlError::Encoding(_))));
}

// ── Navigation ────────────────────────────────────────────────────────────────

const TASKS: &[u8] = br#"<get_tasks_response status="200" status_text="OK">
  <task id="t-1">
    <name>Nightly &amp; full</name>
    <comment></comment>
    <status>Running</status>
    <progress>42</progress>
    <first_report><report id="r-1"/></first_report>
  </task>
  <task id="t-2">
    <name>Adhoc</name>
    <status>Done</status>
  </task>
</get_tasks_response>"#;

#[test]
fn paths_and_text_resolve() {
    let root = parse(TASKS).unwrap();
    let tasks = root.find_all("get_tasks_response/task");
    assert_eq!(tasks.len(), 2);

    let first = tasks[0];
    assert_eq!(first.require_attr("id").unwrap(), "t-1");
    assert_eq!(first.require_text("name").unwrap(), "Nightly & full");
    assert_eq!(first.parse_attr::<String>("id").unwrap(), "t-1");
    assert_eq!(first.find("first_report/report").and_then(|r| r.attr("id")), Some("r-1"));
    assert_eq!(first.opt_text("comment"), None);
    assert_eq!(first.require_text("comment").unwrap(), "");
}

#[test]
fn optional_lookups_resolve_to_none() {
    let root = parse(TASKS).unwrap();
    let second = root.find_all("get_tasks_response/task")[1];

    assert!(second.find("last_report/report").is_none());
    assert_eq!(second.opt_text("progress"), None);
}

#[test]
fn missing_attribute_names_element_and_attribute() {
    let root = parse(TASKS).unwrap();
    let task = root.require("get_tasks_response/task").unwrap();

    match task.require_attr("owner") {
        Err(XmlError::MissingAttribute { element, attribute }) => {
            assert_eq!(element, "task");
            assert_eq!(attribute, "owner");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn cdata_is_text() {
    let root = parse(b"<report><![CDATA[a<b]]></report>").unwrap();
    assert_eq!(root.require_text("report").unwrap(), "a<b");
}

// ── Status ────────────────────────────────────────────────────────────────────

#[test]
fn status_success_range_is_inclusive() {
    let root = parse(br#"<a status="200"/><b status="299"/><c status="199"/><d status="300"/><e status="400" status_text="Bogus"/>"#).unwrap();

    let ok = |name| Status::of(root.require(name).unwrap()).unwrap().is_success();
    assert!(ok("a"));
    assert!(ok("b"));
    assert!(!ok("c"));
    assert!(!ok("d"));

    let e = Status::of(root.require("e").unwrap()).unwrap();
    assert_eq!(e.code, 400);
    assert_eq!(e.text.as_deref(), Some("Bogus"));
    assert_eq!(e.to_string(), "400 (Bogus)");
}

#[test]
fn absent_or_garbled_status_is_a_parse_error() {
    let root = parse(br#"<a/><b status="two hundred"/>"#).unwrap();

    assert!(matches!(Status::of(root.require("a").unwrap()), Err(XmlError::MissingAttribute { .. })));
    assert!(matches!(Status::of(root.require("b").unwrap()), Err(XmlError::InvalidValue { .. })));
}
