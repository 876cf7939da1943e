use std::collections::HashMap;
use wext_web::{
    CompletionOutcome, FetchedFragment, HEADER_UPDATES_HEADER, Navigator, Page, PageData,
    PageRouter, RequestContext, compose,
};

const SHELL: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
</head>
<body>
  <wext-router></wext-router>
  <script type="module" src="/wext-client.js"></script>
</body>
</html>"#;

fn main() -> Result<(), String> {
    let router = PageRouter::new(vec![
        Page::new("/", SHELL, |_| {
            Ok(PageData::new("<h1>Wext</h1><h2>Home</h2>").with_head("<title>Welcome</title>"))
        }),
        Page::new("/:slug", SHELL, |ctx| {
            let slug = ctx.params.get("slug").cloned().unwrap_or_default();
            Ok(PageData::new(format!("<h2>{slug}</h2>"))
                .with_head(format!("<title>{slug}</title>")))
        }),
    ]);

    // First load: the full document.
    let (page, params) = router.match_route("/").map_err(|e| e.to_string())?;
    let data = (page.handler)(&RequestContext {
        params,
        ..RequestContext::default()
    })
    .map_err(|e| e.to_string())?;
    let full = compose(&page.template, &data, false);
    println!("--- full document ---\n{}", full.html);

    // Client-side navigation: fragment only, title out of band.
    let mut navigator = Navigator::new("/");
    let mut fetcher = |path: &str| {
        let (page, params) = router.match_route(path)?;
        let ctx = RequestContext {
            path: path.to_string(),
            params,
            headers: HashMap::from([("x-partial-content".to_string(), "true".to_string())]),
            ..RequestContext::default()
        };
        let data = (page.handler)(&ctx)?;
        let partial = compose(&page.template, &data, true);
        Ok(FetchedFragment {
            body: partial.html,
            header_updates: partial
                .headers
                .iter()
                .find(|(n, _)| n == HEADER_UPDATES_HEADER)
                .map(|(_, v)| v.clone()),
        })
    };

    let outcome = navigator
        .navigate(&mut fetcher, "/about")
        .map_err(|e| e.to_string())?;
    assert_eq!(outcome, CompletionOutcome::Applied);

    println!("--- after navigation ---");
    println!("container: {}", navigator.container());
    println!("title:     {}", navigator.title());
    println!("history:   {:?}", navigator.history());
    Ok(())
}
