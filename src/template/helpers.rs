// ABOUTME: Handlebars helper functions for job card and definition templates
// ABOUTME: Implements zero padding, cycle date formatting, environment lookup, and string helpers

use handlebars::{Context, Handlebars, Helper, Output, RenderContext, RenderError};
use serde_json::Value as JsonValue;
use std::env;

use crate::vars::value::parse_cycle_date;

/// Widest padding `zpad` will produce.
pub const MAX_ZPAD_WIDTH: usize = 32;

/// Zero-pad helper - `{{zpad fhr 3}}` renders 6 as `006`
pub fn zpad_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let number = h
        .param(0)
        .and_then(|v| as_u64(v.value()))
        .ok_or_else(|| RenderError::new("zpad helper requires a non-negative integer"))?;

    let width = h
        .param(1)
        .and_then(|v| as_u64(v.value()))
        .unwrap_or(3)
        .min(MAX_ZPAD_WIDTH as u64) as usize;

    out.write(&format!("{:0width$}", number, width = width))?;
    Ok(())
}

/// Cycle date helper - reformats a cycle date such as `2023060112`
pub fn cycle_date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let date = h
        .param(0)
        .and_then(|v| match v.value() {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| RenderError::new("cycle_date helper requires a date parameter"))?;

    let format = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y%m%d");

    let parsed = parse_cycle_date(&date)
        .ok_or_else(|| RenderError::new(format!("Failed to parse cycle date: {}", date)))?;

    out.write(&parsed.format(format).to_string())?;
    Ok(())
}

/// Environment variable helper - gets environment variable value
pub fn env_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let var_name = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("env helper requires variable name parameter"))?;

    let default_value = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

    let value = env::var(var_name).unwrap_or_else(|_| default_value.to_string());
    out.write(&value)?;
    Ok(())
}

/// Uppercase helper
pub fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("upper helper requires input parameter"))?;

    out.write(&input.to_uppercase())?;
    Ok(())
}

/// Lowercase helper
pub fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("lower helper requires input parameter"))?;

    out.write(&input.to_lowercase())?;
    Ok(())
}

/// Join helper - `{{join " " tasks}}`
pub fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let separator = h.param(0).and_then(|v| v.value().as_str()).unwrap_or(",");

    let array = h
        .param(1)
        .and_then(|v| v.value().as_array())
        .ok_or_else(|| RenderError::new("join helper requires array parameter"))?;

    let items: Vec<String> = array
        .iter()
        .map(|v| match v {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    out.write(&items.join(separator))?;
    Ok(())
}

/// Default helper - provides default value if variable is empty
pub fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let value = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");

    let default_value = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("default helper requires default value parameter"))?;

    let result = if value.is_empty() {
        default_value
    } else {
        value
    };

    out.write(result)?;
    Ok(())
}

fn as_u64(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Register all built-in helpers with a Handlebars instance
pub fn register_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("zpad", Box::new(zpad_helper));
    handlebars.register_helper("cycle_date", Box::new(cycle_date_helper));
    handlebars.register_helper("env", Box::new(env_helper));
    handlebars.register_helper("upper", Box::new(upper_helper));
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("join", Box::new(join_helper));
    handlebars.register_helper("default", Box::new(default_helper));
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlebars::Handlebars;
    use serde_json::json;

    fn create_test_handlebars() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        register_helpers(&mut handlebars);
        handlebars
    }

    #[test]
    fn test_zpad_helper() {
        let handlebars = create_test_handlebars();
        let result = handlebars
            .render_template("f{{zpad fhr 3}} s{{zpad split 2}}", &json!({"fhr": 6, "split": "4"}))
            .unwrap();
        assert_eq!(result, "f006 s04");
    }

    #[test]
    fn test_zpad_width_is_clamped() {
        let handlebars = create_test_handlebars();
        let result = handlebars
            .render_template("{{zpad 1 99999999999}}", &json!({}))
            .unwrap();
        assert_eq!(result.len(), MAX_ZPAD_WIDTH);
        assert!(result.ends_with('1'));
    }

    #[test]
    fn test_cycle_date_helper() {
        let handlebars = create_test_handlebars();
        let result = handlebars
            .render_template(
                "{{cycle_date date}} {{cycle_date date \"%H\"}}",
                &json!({"date": "2023060112"}),
            )
            .unwrap();
        assert_eq!(result, "20230601 12");

        let bad = handlebars.render_template("{{cycle_date \"soon\"}}", &json!({}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_env_helper() {
        std::env::set_var("ECFGEN_TEST_VAR", "test_value");
        let handlebars = create_test_handlebars();
        let result = handlebars
            .render_template("{{env \"ECFGEN_TEST_VAR\"}}", &json!({}))
            .unwrap();
        assert_eq!(result, "test_value");

        let result_default = handlebars
            .render_template(
                "{{env \"ECFGEN_NONEXISTENT_VAR\" \"default_value\"}}",
                &json!({}),
            )
            .unwrap();
        assert_eq!(result_default, "default_value");
    }

    #[test]
    fn test_case_helpers() {
        let handlebars = create_test_handlebars();
        let upper = handlebars
            .render_template("{{upper net}}", &json!({"net": "aqm"}))
            .unwrap();
        assert_eq!(upper, "AQM");

        let lower = handlebars
            .render_template("{{lower \"PROD\"}}", &json!({}))
            .unwrap();
        assert_eq!(lower, "prod");
    }

    #[test]
    fn test_join_helper() {
        let handlebars = create_test_handlebars();
        let result = handlebars
            .render_template("{{join \" \" tasks}}", &json!({"tasks": ["make_ics", "make_lbcs"]}))
            .unwrap();
        assert_eq!(result, "make_ics make_lbcs");
    }

    #[test]
    fn test_default_helper() {
        let handlebars = create_test_handlebars();
        let result = handlebars
            .render_template("{{default \"\" \"fallback\"}}", &json!({}))
            .unwrap();
        assert_eq!(result, "fallback");

        let result2 = handlebars
            .render_template("{{default \"value\" \"fallback\"}}", &json!({}))
            .unwrap();
        assert_eq!(result2, "value");
    }
}
