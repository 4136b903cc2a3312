//! URL Module - URL parsing, building and query-string utilities for scripts
//!
//! Registers a module object (named `url` by default) with:
//! - url.parse(str) -> [record, null] | [null, error]
//! - url.build(options) -> string
//! - url.build_query_string(obj) -> string
//! - url.resolve(base, ref) -> [string, null] | [null, error]
//! - url.type(str) -> "ip" | "domain" | "host" | "url" | "unknown"
//! - url.urlencode(str) / url.urldecode(str)
//!
//! Failures that scripts are expected to handle come back as the second
//! element of a two-element array instead of being thrown.

use boa_engine::{
    Context, JsNativeError, JsResult, JsString, JsValue, NativeFunction, js_string,
    object::ObjectInitializer, object::builtins::JsArray,
};

use super::RuntimeConfig;
use super::marshal;
use crate::{classify, query, record};

/// Register the url module on the global object
pub fn register_url_module(context: &mut Context, config: &RuntimeConfig) -> JsResult<()> {
    let max_depth = config.max_depth;

    let url_module = ObjectInitializer::new(context)
        .function(
            NativeFunction::from_fn_ptr(url_parse),
            js_string!("parse"),
            1,
        )
        .function(
            NativeFunction::from_copy_closure(move |_this, args, context| {
                url_build(args, max_depth, context)
            }),
            js_string!("build"),
            1,
        )
        .function(
            NativeFunction::from_copy_closure(move |_this, args, context| {
                url_build_query_string(args, max_depth, context)
            }),
            js_string!("build_query_string"),
            1,
        )
        .function(
            NativeFunction::from_fn_ptr(url_resolve),
            js_string!("resolve"),
            2,
        )
        .function(NativeFunction::from_fn_ptr(url_type), js_string!("type"), 1)
        .function(
            NativeFunction::from_fn_ptr(url_urlencode),
            js_string!("urlencode"),
            1,
        )
        .function(
            NativeFunction::from_fn_ptr(url_urldecode),
            js_string!("urldecode"),
            1,
        )
        .build();

    context.global_object().set(
        JsString::from(config.module_name.as_str()),
        url_module,
        false,
        context,
    )?;

    log::debug!("registered url module as `{}`", config.module_name);
    Ok(())
}

/// Required string argument, mirroring a host-side argument check
fn string_arg(args: &[JsValue], index: usize, func: &str, context: &mut Context) -> JsResult<String> {
    match args.get(index) {
        Some(value) if !value.is_null_or_undefined() => {
            Ok(value.to_string(context)?.to_std_string_escaped())
        }
        _ => Err(JsNativeError::typ()
            .with_message(format!(
                "bad argument #{} to '{}' (string expected)",
                index + 1,
                func
            ))
            .into()),
    }
}

fn object_expected(index: usize, func: &str) -> boa_engine::JsError {
    JsNativeError::typ()
        .with_message(format!(
            "bad argument #{} to '{}' (object expected)",
            index + 1,
            func
        ))
        .into()
}

/// `[value, null]` or `[null, error]`
fn two_values(first: JsValue, second: JsValue, context: &mut Context) -> JsResult<JsValue> {
    let result = JsArray::new(context);
    result.push(first, context)?;
    result.push(second, context)?;
    Ok(result.into())
}

fn failure(message: String, context: &mut Context) -> JsResult<JsValue> {
    two_values(JsValue::null(), JsValue::from(js_string!(message)), context)
}

/// url.parse(str)
fn url_parse(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let raw = string_arg(args, 0, "parse", context)?;

    match record::parse(&raw) {
        Ok(parsed) => {
            let object = marshal::record_to_object(&parsed, context)?;
            two_values(object, JsValue::null(), context)
        }
        Err(err) => {
            log::debug!("url.parse: {err}");
            failure(err.to_string(), context)
        }
    }
}

/// url.build(options)
fn url_build(args: &[JsValue], max_depth: usize, context: &mut Context) -> JsResult<JsValue> {
    let options = args
        .first()
        .and_then(|v| v.as_object())
        .ok_or_else(|| object_expected(0, "build"))?;

    let options = marshal::to_build_options(&options, max_depth, context)?;
    Ok(JsValue::from(js_string!(record::build(&options))))
}

/// url.build_query_string(obj)
fn url_build_query_string(
    args: &[JsValue],
    max_depth: usize,
    context: &mut Context,
) -> JsResult<JsValue> {
    let value = args.first().cloned().unwrap_or(JsValue::undefined());
    let entries = marshal::to_query_entries(&value, max_depth, context)?
        .ok_or_else(|| object_expected(0, "build_query_string"))?;

    Ok(JsValue::from(js_string!(query::encode(&entries))))
}

/// url.resolve(base, reference)
fn url_resolve(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let base = string_arg(args, 0, "resolve", context)?;
    let reference = string_arg(args, 1, "resolve", context)?;

    match record::resolve(&base, &reference) {
        Ok(resolved) => two_values(JsValue::from(js_string!(resolved)), JsValue::null(), context),
        Err(err) => {
            log::debug!("url.resolve: {err}");
            failure(err.to_string(), context)
        }
    }
}

/// url.type(str)
fn url_type(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = string_arg(args, 0, "type", context)?;
    Ok(JsValue::from(js_string!(classify::classify(&input).as_str())))
}

/// url.urlencode(str)
fn url_urlencode(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = string_arg(args, 0, "urlencode", context)?;
    Ok(JsValue::from(js_string!(query::escape(&input))))
}

/// url.urldecode(str) - malformed input comes back unchanged
fn url_urldecode(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = string_arg(args, 0, "urldecode", context)?;
    let decoded = query::unescape(&input).unwrap_or_else(|err| {
        log::debug!("url.urldecode: {err}");
        input.clone()
    });
    Ok(JsValue::from(js_string!(decoded)))
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Runtime, RuntimeConfig};

    fn eval(runtime: &mut Runtime, code: &str) -> String {
        let value = runtime.eval(code, "test.js").unwrap();
        runtime.value_to_string(&value)
    }

    #[test]
    fn test_build_query_string() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(eval(&mut runtime, "url.build_query_string({b: 1, a: 1})"), "a=1&b=1");
        assert_eq!(eval(&mut runtime, "url.build_query_string({a: 1, b: 1})"), "a=1&b=1");
        assert_eq!(
            eval(&mut runtime, "url.build_query_string({a: ['x', 'y']})"),
            "a%5B%5D=x&a%5B%5D=y"
        );
        assert_eq!(
            eval(&mut runtime, "url.build_query_string({q: 'a b', ok: true, n: 2.5})"),
            "n=2.5&ok=true&q=a+b"
        );
    }

    #[test]
    fn test_build_query_string_nesting() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(
                &mut runtime,
                "url.build_query_string({a: [{b: 1}, {b: 2}], c: {d: 'e'}})"
            ),
            "a%5B0%5D%5Bb%5D=1&a%5B1%5D%5Bb%5D=2&c%5Bd%5D=e"
        );
        // A map nested under an `[]` key is not recursed into
        assert_eq!(
            eval(&mut runtime, "url.build_query_string({'a[]': [1, {b: 2}]})"),
            "a%5B%5D=1&a%5B%5D="
        );
    }

    #[test]
    fn test_build_query_string_skips_unsupported_values() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(
                &mut runtime,
                "url.build_query_string({a: null, b: undefined, c: () => 1, d: 'x'})"
            ),
            "d=x"
        );
        assert_eq!(eval(&mut runtime, "url.build_query_string({})"), "");
    }

    #[test]
    fn test_build_query_string_drops_back_references() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(
                &mut runtime,
                "(() => { const o = {x: 1}; o.self = o; return url.build_query_string(o); })()",
            ),
            "x=1"
        );
        // Two back references per level must not multiply the work
        assert_eq!(
            eval(
                &mut runtime,
                "(() => { const o = {x: 1}; o.a = o; o.b = o; return url.build_query_string(o); })()",
            ),
            "x=1"
        );
        assert_eq!(
            eval(
                &mut runtime,
                "(() => { const o = {x: 1, list: []}; o.list.push(o, 'v'); return url.build_query_string(o); })()",
            ),
            "list%5B%5D=v&x=1"
        );
    }

    #[test]
    fn test_build_query_string_shared_value_is_not_a_cycle() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(
                &mut runtime,
                "(() => { const s = {v: 1}; return url.build_query_string({a: s, b: s}); })()",
            ),
            "a%5Bv%5D=1&b%5Bv%5D=1"
        );
    }

    #[test]
    fn test_build_query_string_sparse_arrays() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(
                &mut runtime,
                "url.build_query_string({a: new Array(2 ** 32 - 1), b: 1})"
            ),
            "&b=1"
        );
        assert_eq!(
            eval(
                &mut runtime,
                "(() => { const a = []; a[7] = 'x'; a[2] = 'w'; return url.build_query_string({a}); })()",
            ),
            "a%5B%5D=w&a%5B%5D=x"
        );
    }

    #[test]
    fn test_build_query_string_requires_object() {
        let mut runtime = Runtime::new().unwrap();
        assert!(runtime.eval("url.build_query_string('a=1')", "test.js").is_err());
    }

    #[test]
    fn test_parse() {
        let mut runtime = Runtime::new().unwrap();
        let code = r#"
            (() => {
                const [u, err] = url.parse('http://bob:pw@example.com:8080/a%20b?x=1&x=2&y=3#top');
                return [
                    err, u.scheme, u.username, u.password, u.host, u.hostname, u.port,
                    u.path, u.rawpath, u.rawquery, u.fragment,
                    u.query.x.join('+'), u.query.y,
                ].join('|');
            })()
        "#;
        assert_eq!(
            eval(&mut runtime, code),
            "|http|bob|pw|example.com:8080|example.com|8080|/a b|/a%20b|x=1&x=2&y=3|top|1+2|3"
        );
    }

    #[test]
    fn test_parse_absent_userinfo_is_null() {
        let mut runtime = Runtime::new().unwrap();
        let code = r#"
            (() => {
                const [a] = url.parse('http://example.com/');
                const [b] = url.parse('http://bob@example.com/');
                return [a.username === null, a.password === null,
                        b.username, b.password === null, a.port === ''].join(',');
            })()
        "#;
        assert_eq!(eval(&mut runtime, code), "true,true,bob,true,true");
    }

    #[test]
    fn test_parse_relative_reference() {
        let mut runtime = Runtime::new().unwrap();
        let code = r#"
            (() => {
                const [u, err] = url.parse('/a/b?x=1');
                return [err, u.scheme, u.host, u.path, u.rawquery, u.query.x].join('|');
            })()
        "#;
        assert_eq!(eval(&mut runtime, code), "|||/a/b|x=1|1");
    }

    #[test]
    fn test_parse_failure_returns_error() {
        let mut runtime = Runtime::new().unwrap();
        let code = r#"
            (() => {
                const [u, err] = url.parse('http://[::1');
                return (u === null) + ':' + (typeof err);
            })()
        "#;
        assert_eq!(eval(&mut runtime, code), "true:string");
        assert!(runtime.eval("url.parse()", "test.js").is_err());
    }

    #[test]
    fn test_build() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(
                &mut runtime,
                "url.build({scheme: 'https', username: 'bob', password: 'pw', host: 'example.com', path: '/x', rawquery: 'a=1', fragment: 'f'})"
            ),
            "https://bob:pw@example.com/x?a=1#f"
        );
        assert_eq!(
            eval(
                &mut runtime,
                "url.build({scheme: 'http', username: 'bob', host: 'example.com', path: '/'})"
            ),
            "http://bob@example.com/"
        );
        assert_eq!(
            eval(
                &mut runtime,
                "url.build({scheme: 'http', host: 'example.com', path: '/s', query: {q: 'rust', p: [1, 2]}})"
            ),
            "http://example.com/s?p%5B%5D=1&p%5B%5D=2&q=rust"
        );
        assert_eq!(
            eval(
                &mut runtime,
                "url.build({scheme: 'http', host: 'example.com', path: '/s', query: 'raw=1', password: null})"
            ),
            "http://example.com/s?raw=1"
        );
    }

    #[test]
    fn test_parse_build_round_trip() {
        let mut runtime = Runtime::new().unwrap();
        let code = r#"
            (() => {
                const input = 'https://example.com/path/to?x=1&y=2#frag';
                const [u] = url.parse(input);
                const [again] = url.parse(url.build(u));
                return [again.scheme, again.host, again.path, again.rawquery, again.fragment].join('|');
            })()
        "#;
        assert_eq!(eval(&mut runtime, code), "https|example.com|/path/to|x=1&y=2|frag");
    }

    #[test]
    fn test_resolve() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(
            eval(&mut runtime, "url.resolve('http://a.com/b/', 'c')[0]"),
            "http://a.com/b/c"
        );
        assert_eq!(
            eval(&mut runtime, "url.resolve('http://a.com/b', '/c')[0]"),
            "http://a.com/c"
        );
        assert_eq!(
            eval(&mut runtime, "url.resolve('nope', '/c')[0] === null"),
            "true"
        );
    }

    #[test]
    fn test_type() {
        let mut runtime = Runtime::new().unwrap();
        let code = r#"
            ['192.168.0.1', 'example.com', 'example.com:8080',
             'http://example.com/x', 'not a url'].map(s => url.type(s)).join(',')
        "#;
        assert_eq!(eval(&mut runtime, code), "ip,domain,host,url,unknown");
    }

    #[test]
    fn test_urlencode_urldecode() {
        let mut runtime = Runtime::new().unwrap();
        assert_eq!(eval(&mut runtime, "url.urlencode('a b&c')"), "a+b%26c");
        assert_eq!(eval(&mut runtime, "url.urldecode('a+b%26c')"), "a b&c");
        assert_eq!(eval(&mut runtime, "url.urldecode('%')"), "%");
        assert_eq!(eval(&mut runtime, "url.urldecode('100%zz')"), "100%zz");
        assert_eq!(
            eval(&mut runtime, "url.urldecode(url.urlencode('ü ~ [] ?'))"),
            "ü ~ [] ?"
        );
    }

    #[test]
    fn test_custom_module_name() {
        let config = RuntimeConfig {
            module_name: "urlx".to_string(),
            ..Default::default()
        };
        let mut runtime = Runtime::with_config(config).unwrap();
        assert_eq!(eval(&mut runtime, "typeof urlx.parse"), "function");
        assert_eq!(eval(&mut runtime, "typeof url"), "undefined");
    }
}
