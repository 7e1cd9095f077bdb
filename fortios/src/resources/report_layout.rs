//! `report layout`

use super::{cached, enable_disable, int_range, max_len, one_of};
use crate::resource::ResourceDefinition;
use fortimap::{FieldBuilder, MapError, ObjectSchema, SchemaBuilder};
use std::sync::OnceLock;

pub const TYPE_NAME: &str = "fortios_report_layout";

fn header_footer(local_name: &str) -> FieldBuilder {
    FieldBuilder::record(
        local_name,
        vec![
            FieldBuilder::string("style").validator(max_len(71)),
            FieldBuilder::table(
                &format!("{}_item", local_name),
                vec![
                    FieldBuilder::int("id"),
                    FieldBuilder::string("description").validator(max_len(63)),
                    one_of("type", &["text", "image"]),
                    FieldBuilder::string("style").validator(max_len(71)),
                    FieldBuilder::string("content").validator(max_len(511)),
                    FieldBuilder::string("img_src").validator(max_len(127)),
                ],
            )
            .sort_key("id"),
        ],
    )
}

fn page() -> FieldBuilder {
    FieldBuilder::record(
        "page",
        vec![
            one_of("paper", &["a4", "letter"]),
            FieldBuilder::string("column_break_before"),
            FieldBuilder::string("page_break_before"),
            FieldBuilder::string("options"),
            header_footer("header"),
            header_footer("footer"),
        ],
    )
}

fn body_item() -> FieldBuilder {
    FieldBuilder::table(
        "body_item",
        vec![
            int_range("id", 0, 4294967295),
            FieldBuilder::string("description").validator(max_len(63)),
            one_of("type", &["text", "image", "chart", "misc"]),
            FieldBuilder::string("style").validator(max_len(71)),
            int_range("top_n", 0, 4294967295),
            enable_disable("hide"),
            one_of(
                "text_component",
                &["text", "heading1", "heading2", "heading3"],
            ),
            FieldBuilder::string("content").validator(max_len(511)),
            FieldBuilder::string("img_src").validator(max_len(127)),
            FieldBuilder::string("title").validator(max_len(511)),
            FieldBuilder::string("chart").validator(max_len(71)),
            FieldBuilder::string("chart_options"),
            FieldBuilder::string("drill_down_items").validator(max_len(11)),
            one_of("drill_down_types", &["hour", "day", "week"]),
            int_range("column", 0, 255),
            FieldBuilder::table(
                "parameters",
                vec![
                    int_range("id", 0, 4294967295),
                    FieldBuilder::string("name").validator(max_len(127)),
                    FieldBuilder::string("value").validator(max_len(1023)),
                ],
            )
            .sort_key("id"),
        ],
    )
    .sort_key("id")
}

pub fn schema() -> Result<ObjectSchema, MapError> {
    SchemaBuilder::new("report.layout")
        .description("Report layout configuration.")
        .mkey("name")
        .field(FieldBuilder::string("name").required().validator(max_len(35)))
        .field(FieldBuilder::string("title").validator(max_len(127)))
        .field(FieldBuilder::string("subtitle").validator(max_len(127)))
        .field(FieldBuilder::string("description").validator(max_len(127)))
        .field(FieldBuilder::string("style_theme").required().validator(max_len(35)))
        .field(FieldBuilder::string("options"))
        .field(one_of("format", &["pdf"]))
        .field(one_of("schedule_type", &["demand", "daily", "weekly"]).default("daily"))
        .field(one_of(
            "day",
            &[
                "sunday",
                "monday",
                "tuesday",
                "wednesday",
                "thursday",
                "friday",
                "saturday",
            ],
        ))
        .field(FieldBuilder::string("time"))
        .field(one_of("cutoff_option", &["run-time", "custom"]))
        .field(FieldBuilder::string("cutoff_time"))
        .field(enable_disable("email_send"))
        .field(FieldBuilder::string("email_recipients").validator(max_len(511)))
        .field(int_range("max_pdf_report", 1, 365))
        .field(page())
        .field(body_item())
        .build()
}

pub fn definition() -> Result<&'static ResourceDefinition, MapError> {
    static DEFINITION: OnceLock<Result<ResourceDefinition, MapError>> = OnceLock::new();
    cached(&DEFINITION, TYPE_NAME, schema)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use fortimap::{Flattener, Record, SortMode, Value};
    use serde_json::json;

    #[test]
    fn body_items_and_parameters_sort_by_id() {
        let schema = schema().unwrap();
        let remote = Record::try_from(json!({
            "name": "weekly",
            "style-theme": "default-report",
            "body-item": [
                {"id": 10, "type": "chart", "parameters": [{"id": 2, "name": "b"}, {"id": 1, "name": "a"}]},
                {"id": 9, "type": "text"}
            ]
        }))
        .unwrap();

        let local = Flattener::new(&schema)
            .sort(SortMode::Natural)
            .flatten(&remote)
            .unwrap();

        let items = local.get("body_item").and_then(Value::as_list).unwrap();
        let ids: Vec<_> = items
            .iter()
            .filter_map(|row| row.as_record()?.get("id")?.as_int())
            .collect();
        assert_eq!(ids, vec![9, 10]);

        let params = items[1]
            .as_record()
            .and_then(|row| row.get("parameters"))
            .and_then(Value::as_list)
            .unwrap();
        let names: Vec<_> = params
            .iter()
            .filter_map(|row| row.as_record()?.get("name")?.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
