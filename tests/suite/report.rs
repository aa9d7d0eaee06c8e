//! Rendered reports of real runs.

#![cfg(unix)]

use fanout::{execute, render_json, render_text};

use crate::common::{owned, settings};

const SCRIPT: &str = "case {} in slow) sleep 30;; *) exit {};; esac";

#[tokio::test]
async fn text_report_lists_problems_in_input_order() {
    let settings = settings(&["-s", "^#", "--timeout", "1", "--shell", "sh", "--", SCRIPT]);
    let report = execute(&settings, owned(&["0", "3", "#note", "slow", "0"]))
        .await
        .unwrap();

    insta::assert_snapshot!(render_text(&report), @r"
5 items: 2 succeeded, 1 failed, 1 rejected, 1 skipped
failed   [1] 3: exit code 3
rejected [3] slow: timed out after 1s
");
}

#[tokio::test]
async fn json_report_round_trips_the_summary() {
    let settings = settings(&["--shell", "sh", "--", SCRIPT]);
    let report = execute(&settings, owned(&["0", "4"])).await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
    assert_eq!(
        json["summary"],
        serde_json::json!({
            "total": 2,
            "successful": 1,
            "failed": 1,
            "rejected": 0,
            "skipped": 0,
        })
    );
    assert_eq!(json["failed"][0]["item"], "4");
    assert_eq!(json["failed"][0]["exit_code"], 4);
    assert_eq!(json["rejected"], serde_json::json!([]));
}
