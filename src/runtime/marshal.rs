//! Conversions between script values and the crate's Rust types

use boa_engine::{
    Context, JsObject, JsResult, JsString, JsValue, js_string, object::ObjectInitializer,
    object::builtins::JsArray, property::PropertyKey,
};

use crate::query::QueryValue;
use crate::record::{BuildOptions, QueryParam, UrlRecord};

/// Convert a script value into a [`QueryValue`].
///
/// `depth` is the number of container levels still allowed; anything nested
/// deeper becomes [`QueryValue::Unsupported`], and so does a container met
/// again while it is still being converted.
pub(super) fn to_query_value(
    value: &JsValue,
    depth: usize,
    context: &mut Context,
) -> JsResult<QueryValue> {
    let mut open = Vec::new();
    convert(value, depth, &mut open, context)
}

/// `open` holds the containers on the path from the root to `value`
fn convert(
    value: &JsValue,
    depth: usize,
    open: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<QueryValue> {
    if let Some(b) = value.as_boolean() {
        return Ok(QueryValue::Bool(b));
    }
    if let Some(n) = value.as_number() {
        return Ok(QueryValue::Number(n));
    }
    if let Some(s) = value.as_string() {
        return Ok(QueryValue::String(s.to_std_string_escaped()));
    }

    let Some(object) = value.as_object() else {
        return Ok(QueryValue::Unsupported);
    };
    if object.is_callable() {
        return Ok(QueryValue::Unsupported);
    }
    if open.iter().any(|seen| JsObject::equals(seen, &object)) {
        log::debug!("cyclic query value, dropping the back reference");
        return Ok(QueryValue::Unsupported);
    }
    if depth == 0 {
        log::warn!("query value nested too deeply, dropping it");
        return Ok(QueryValue::Unsupported);
    }

    open.push(object.clone());
    let converted = if object.is_array() {
        QueryValue::Seq(array_items(&object, depth - 1, open, context)?)
    } else {
        QueryValue::Map(object_entries(&object, depth - 1, open, context)?)
    };
    open.pop();

    Ok(converted)
}

/// Elements stored in an array, in index order. Holes are skipped, so the
/// work follows the stored elements rather than the script-controlled `length`.
fn array_items(
    array: &JsObject,
    depth: usize,
    open: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<Vec<QueryValue>> {
    let mut items = Vec::new();
    for key in array.own_property_keys(context)? {
        if !matches!(key, PropertyKey::Index(_)) {
            continue;
        }
        let item = array.get(key, context)?;
        items.push(convert(&item, depth, open, context)?);
    }
    Ok(items)
}

/// Own string-keyed properties of `object`, converted
fn object_entries(
    object: &JsObject,
    depth: usize,
    open: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<Vec<(String, QueryValue)>> {
    let keys = object.own_property_keys(context)?;
    let mut entries = Vec::with_capacity(keys.len());

    for key in keys {
        if matches!(key, PropertyKey::Symbol(_)) {
            continue;
        }
        let value = object.get(key.clone(), context)?;
        entries.push((key.to_string(), convert(&value, depth, open, context)?));
    }

    Ok(entries)
}

/// Top-level entries of a value handed to the encoder.
///
/// Arrays are keyed by their index. Returns `None` for non-containers.
pub(super) fn to_query_entries(
    value: &JsValue,
    depth: usize,
    context: &mut Context,
) -> JsResult<Option<Vec<(String, QueryValue)>>> {
    Ok(match to_query_value(value, depth, context)? {
        QueryValue::Map(entries) => Some(entries),
        QueryValue::Seq(items) => Some(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect(),
        ),
        _ => None,
    })
}

fn optional_string(value: Option<&str>) -> JsValue {
    value
        .map(|s| JsValue::from(js_string!(s)))
        .unwrap_or(JsValue::null())
}

/// Build the script object for a parsed URL
pub(super) fn record_to_object(record: &UrlRecord, context: &mut Context) -> JsResult<JsValue> {
    let query = ObjectInitializer::new(context).build();
    for (key, param) in &record.query {
        let value = match param {
            QueryParam::Single(value) => JsValue::from(js_string!(value.as_str())),
            QueryParam::Multi(values) => {
                let array = JsArray::new(context);
                for value in values {
                    array.push(JsValue::from(js_string!(value.as_str())), context)?;
                }
                array.into()
            }
        };
        query.set(js_string!(key.as_str()), value, false, context)?;
    }

    let port = record.port.map(|p| p.to_string()).unwrap_or_default();
    let fields = [
        ("scheme", JsValue::from(js_string!(record.scheme.as_str()))),
        ("username", optional_string(record.username.as_deref())),
        ("password", optional_string(record.password.as_deref())),
        ("host", JsValue::from(js_string!(record.host.as_str()))),
        ("hostname", JsValue::from(js_string!(record.hostname.as_str()))),
        ("port", JsValue::from(js_string!(port))),
        ("path", JsValue::from(js_string!(record.path.as_str()))),
        ("rawpath", JsValue::from(js_string!(record.raw_path.as_str()))),
        ("rawquery", JsValue::from(js_string!(record.raw_query.as_str()))),
        ("fragment", JsValue::from(js_string!(record.fragment.as_str()))),
        ("query", JsValue::from(query)),
    ];

    let result = ObjectInitializer::new(context).build();
    for (name, value) in fields {
        result.set(JsString::from(name), value, false, context)?;
    }
    Ok(JsValue::from(result))
}

/// Read an optional string property; `null` and `undefined` count as absent
fn string_field(object: &JsObject, name: &str, context: &mut Context) -> JsResult<Option<String>> {
    let value = object.get(JsString::from(name), context)?;
    if value.is_null_or_undefined() {
        return Ok(None);
    }
    Ok(Some(value.to_string(context)?.to_std_string_escaped()))
}

/// Read build options from a script object
pub(super) fn to_build_options(
    object: &JsObject,
    depth: usize,
    context: &mut Context,
) -> JsResult<BuildOptions> {
    let mut options = BuildOptions {
        scheme: string_field(object, "scheme", context)?,
        username: string_field(object, "username", context)?,
        password: string_field(object, "password", context)?,
        host: string_field(object, "host", context)?,
        path: string_field(object, "path", context)?,
        raw_query: string_field(object, "rawquery", context)?,
        query: None,
        fragment: string_field(object, "fragment", context)?,
    };

    // `query` may be a pre-encoded string or a structure to encode
    let query = object.get(js_string!("query"), context)?;
    if let Some(raw) = query.as_string() {
        if options.raw_query.is_none() {
            options.raw_query = Some(raw.to_std_string_escaped());
        }
    } else if !query.is_null_or_undefined() {
        options.query = to_query_entries(&query, depth, context)?;
    }

    Ok(options)
}
