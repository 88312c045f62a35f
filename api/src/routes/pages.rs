//! Browser-facing pages. These only render a bare document; the real front end is served
//! separately.

use rocket::{
    get,
    response::{content::RawHtml, Redirect},
    uri,
};

use crate::access;

const WELCOME: &str = "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>Finanzas</title></head>\n<body><h1>Bienvenido</h1></body>\n</html>\n";

#[get("/")]
pub(super) fn welcome() -> RawHtml<&'static str> {
    RawHtml(WELCOME)
}

/// The user's panel, or back to the welcome page without a session.
#[get("/panel")]
pub(super) fn panel(guard: Option<access::SessionGuard>) -> Result<RawHtml<String>, Redirect> {
    let guard = guard.ok_or_else(|| Redirect::to(uri!(welcome)))?;
    let grant = guard.grant();
    Ok(RawHtml(format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>Panel</title></head>\n<body data-correo=\"{email}\"><h1>Hola, {name}</h1><p>{email}</p></body>\n</html>\n",
        name = escape(&grant.name),
        email = escape(&grant.email.0),
    )))
}

/// Always succeeds, with or without a session.
#[get("/logout")]
pub(super) fn logout(cookies: access::SessionCookies<'_>) -> Redirect {
    cookies.end();
    Redirect::to(uri!(welcome))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape(r#"<a href="x" title='y'>&</a>"#),
            "&lt;a href=&quot;x&quot; title=&#39;y&#39;&gt;&amp;&lt;/a&gt;"
        );
        assert_eq!(escape("Ana Pérez"), "Ana Pérez");
    }
}
