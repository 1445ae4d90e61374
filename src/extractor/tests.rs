use super::*;

#[test]
fn prefers_main_over_body() {
    let html = r#"
        <html>
            <body>
                <p>Body filler that should be ignored.</p>
                <main>
                    <h1>Title</h1>
                    <p>The interesting part.</p>
                </main>
            </body>
        </html>
    "#;

    let text = normalize(html);
    assert!(text.contains("The interesting part."));
    assert!(!text.contains("Body filler"));
}

#[test]
fn falls_back_to_body() {
    let html = r#"
        <html>
            <body>
                <p>Plain page without a semantic container.</p>
            </body>
        </html>
    "#;

    let text = normalize(html);
    assert!(text.contains("Plain page without a semantic container."));
}

#[test]
fn strips_boilerplate_regions() {
    let html = r#"
        <html>
            <body>
                <nav>Navigation menu</nav>
                <header>Site header</header>
                <main>
                    <script>var hidden = true;</script>
                    <style>.x { color: red }</style>
                    <p>Actual content paragraph.</p>
                    <aside>Related links</aside>
                </main>
                <footer>Copyright notice</footer>
            </body>
        </html>
    "#;

    let text = normalize(html);
    assert!(text.contains("Actual content paragraph."));
    assert!(!text.contains("Navigation menu"));
    assert!(!text.contains("Site header"));
    assert!(!text.contains("Copyright notice"));
    assert!(!text.contains("var hidden"));
    assert!(!text.contains("color: red"));
    assert!(!text.contains("Related links"));
}

#[test]
fn no_content_region_yields_empty_text() {
    let text = normalize("<html><head><title>t</title></head></html>");
    assert!(text.is_empty());
}

#[test]
fn content_fragment_drops_nav_links() {
    let html = r#"
        <html>
            <body>
                <main>
                    <nav><a href="/boilerplate">Nav link</a></nav>
                    <p><a href="/article">Content link</a></p>
                </main>
            </body>
        </html>
    "#;

    let fragment = content_fragment(html);
    let rendered = fragment.html();
    assert!(rendered.contains("/article"));
    assert!(!rendered.contains("/boilerplate"));
}

#[test]
fn collapses_whitespace() {
    assert_eq!(cleanup_whitespace("a    b\t\tc"), "a b c");
    assert_eq!(cleanup_whitespace("a\n\n\n\nb"), "a\n\nb");
    assert_eq!(cleanup_whitespace("a\nb"), "a\nb");
    assert_eq!(cleanup_whitespace("   padded   "), "padded");
    assert_eq!(cleanup_whitespace("\n\n\nlead and trail\n\n"), "lead and trail");
    assert_eq!(cleanup_whitespace(""), "");
}
