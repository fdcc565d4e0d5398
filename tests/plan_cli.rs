mod support;

use support::TestHousehold;

/// Kim and Lee; dishes rotate starting with Kim, trash is for everyone.
fn rotating_household() -> TestHousehold {
    let household = TestHousehold::init(false);
    household.add_person("Kim");
    household.add_person("Lee");
    household.add_task("Dishes");
    household.add_task("Trash");
    household.json(&["task", "schedule", "Dishes", "--start", "Kim"]);
    household
}

#[test]
fn who_follows_rotation() {
    let household = rotating_household();

    let monday = household.json(&["--date", "2024-01-01", "who"]);
    assert_eq!(monday["weekday"], "mon");
    assert_eq!(monday["chores"][0]["task"], "Dishes");
    assert_eq!(monday["chores"][0]["persons"][0]["name"], "Kim");
    assert_eq!(monday["chores"][1]["persons"].as_array().map(Vec::len), Some(2));

    let tuesday = household.json(&["--date", "2024-01-02", "who"]);
    assert_eq!(tuesday["chores"][0]["persons"][0]["name"], "Lee");

    // same weekday one week later: 7 days is odd, so the turn flips
    let next_monday = household.json(&["--date", "2024-01-08", "who"]);
    assert_eq!(next_monday["chores"][0]["persons"][0]["name"], "Lee");
}

#[test]
fn done_toggles_and_rejects_unassigned() {
    let household = rotating_household();

    let done = household.json(&["--date", "2024-01-01", "done", "kim", "dishes"]);
    assert_eq!(done["done"], true);
    assert_eq!(done["date"], "2024-01-01");

    let who = household.json(&["--date", "2024-01-01", "who"]);
    assert_eq!(who["chores"][0]["persons"][0]["done"], true);

    let envelope = household.json_error(&["--date", "2024-01-01", "done", "Lee", "Dishes"], 3);
    assert_eq!(envelope["command"], "done");
    assert_eq!(envelope["error"]["kind"], "not_assigned");
    assert_eq!(envelope["error"]["details"]["person"], "Lee");
    assert_eq!(envelope["error"]["details"]["date"], "2024-01-01");

    let undone = household.json(&["--date", "2024-01-01", "done", "Kim", "Dishes"]);
    assert_eq!(undone["done"], false);
}

#[test]
fn week_toggle_narrows_plan() {
    let household = rotating_household();

    let toggled = household.json(&["--date", "2024-01-03", "week", "toggle", "Trash"]);
    assert_eq!(toggled["active"], false);
    assert_eq!(toggled["week_start"], "2024-01-01");

    let week = household.json(&["--date", "2024-01-05", "week", "show"]);
    assert_eq!(week["week_start"], "2024-01-01");
    assert_eq!(week["active_tasks"].as_array().map(Vec::len), Some(1));
    assert_eq!(week["inactive_tasks"][0]["name"], "Trash");
    assert_eq!(week["days"].as_array().map(Vec::len), Some(7));
    assert_eq!(week["days"][1]["chores"][0]["persons"][0]["name"], "Lee");
    assert_eq!(week["days"][6]["chores"].as_array().map(Vec::len), Some(1));

    // other weeks are unaffected
    let next = household.json(&["--date", "2024-01-08", "week", "show"]);
    assert_eq!(next["inactive_tasks"].as_array().map(Vec::len), Some(0));

    household.json_error(&["--date", "2024-01-01", "done", "Kim", "Trash"], 3);

    let back_on = household.json(&["--date", "2024-01-07", "week", "toggle", "trash"]);
    assert_eq!(back_on["active"], true);
}

#[test]
fn stats_count_possible_units() {
    let household = rotating_household();
    household.json(&["--date", "2024-01-01", "week", "toggle", "Trash"]);
    household.json(&["--date", "2024-01-01", "done", "Kim", "Dishes"]);
    household.json(&["--date", "2024-01-02", "done", "Lee", "Dishes"]);

    let week = household.json(&["--date", "2024-01-04", "stats", "--period", "week"]);
    let periods = week["periods"].as_array().expect("periods");
    assert_eq!(periods.len(), 1);
    let stats = &periods[0]["stats"];
    assert_eq!(periods[0]["period"], "week");
    assert_eq!(periods[0]["start"], "2024-01-01");
    assert_eq!(periods[0]["end"], "2024-01-07");
    assert_eq!(stats["total_possible"], 7);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["per_person"][0]["person"]["name"], "Kim");
    assert_eq!(stats["per_person"][0]["total"], 4);
    assert_eq!(stats["per_person"][1]["total"], 3);
    assert_eq!(stats["per_task"][0]["completed"], 2);
    assert_eq!(stats["per_task"][1]["completed"], 0);

    let all = household.json(&["--date", "2024-01-04", "stats"]);
    let periods: Vec<&str> = all["periods"]
        .as_array()
        .expect("periods")
        .iter()
        .map(|report| report["period"].as_str().expect("period"))
        .collect();
    assert_eq!(periods, vec!["week", "month", "year"]);

    household.json_error(&["stats", "--period", "decade"], 2);
}

#[test]
fn stats_without_tasks_are_zero() {
    let household = TestHousehold::init(false);
    household.add_person("Kim");

    let data = household.json(&["--date", "2024-01-04", "stats", "--period", "year"]);
    let stats = &data["periods"][0]["stats"];
    assert_eq!(stats["total_possible"], 0);
    assert_eq!(stats["completion_rate"], 0.0);
    assert_eq!(stats["per_person"][0]["rate"], 0.0);
}

#[test]
fn summary_for_one_person() {
    let household = rotating_household();
    household.json(&["--date", "2024-01-01", "week", "toggle", "Trash"]);
    household.json(&["--date", "2024-01-03", "done", "Kim", "Dishes"]);

    let data = household.json(&["--date", "2024-01-03", "summary", "--person", "Kim"]);
    assert_eq!(data["week_start"], "2024-01-01");
    assert_eq!(data["days"].as_array().map(Vec::len), Some(7));
    assert_eq!(data["days"][2]["completed"], 1);
    assert_eq!(data["days"][1]["total"], 0);
    assert_eq!(data["week"]["total"], 4);
    assert_eq!(data["week"]["completed"], 1);
    assert_eq!(data["rating"], "steady_snail");

    let everyone = household.json(&["--date", "2024-01-03", "summary"]);
    assert_eq!(everyone["week"]["total"], 7);
    assert!(everyone.get("person").is_none());
}
