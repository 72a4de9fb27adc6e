// HTML Sanitizer
// Ordered, lexical rewrite passes over converter output. No DOM is built; markup
// that does not match a pattern passes through untouched, except that leftover
// fragments of the removed constructs (unclosed tags, bare schemes) are deleted.

use once_cell::sync::Lazy;
use regex::Regex;

/// A named text-to-text rewrite
pub type Pass = fn(&str) -> String;

/// Pass order is significant: content-span removals run before the
/// attribute-level passes that only look at opening tags.
pub const PASSES: [(&str, Pass); 5] = [
    ("strip_images", strip_images),
    ("collapse_head", collapse_head),
    ("unwrap_spans", unwrap_spans),
    ("strip_attributes", strip_attributes),
    ("strip_comments_and_links", strip_comments_and_links),
];

/// Run every pass in order until the document stops changing
///
/// Total over any input. Every pass only removes or empties content, so the
/// loop terminates; iterating to a fixed point makes the result idempotent even
/// when a removal splices two fragments into a new match.
pub fn sanitize(html: &str) -> String {
    until_stable(html, |text| {
        PASSES
            .iter()
            .fold(text.to_string(), |acc, (_, pass)| pass(&acc))
    })
}

fn until_stable(input: &str, step: impl Fn(&str) -> String) -> String {
    let mut current = step(input);
    loop {
        let next = step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn remove_all(re: &Regex, text: String) -> String {
    replace_all(re, text, "")
}

fn replace_all(re: &Regex, text: String, replacement: &str) -> String {
    match re.replace_all(&text, replacement) {
        std::borrow::Cow::Borrowed(_) => text,
        std::borrow::Cow::Owned(replaced) => replaced,
    }
}

/// Builds `\s+<name>\s*=\s*<value>` for double-quoted, single-quoted, bare and empty values
fn attribute_regex(name: &str) -> Regex {
    let pattern = format!(
        r#"(?i)\s+{}\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)?"#,
        name
    );
    Regex::new(&pattern).expect("attribute pattern is valid")
}

// ============================================================================
// Pass 1: embedded images
// ============================================================================

static RE_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

static RE_PICTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<picture\b[^>]*/>|<picture\b[^>]*>.*?</picture\s*>").unwrap()
});

static RE_SVG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<svg\b[^>]*/>|<svg\b[^>]*>.*?</svg\s*>").unwrap());

static RE_BACKGROUND_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)background-image\s*:\s*[^;]+;?").unwrap());

// Whatever the element rules above could not pair up
static RE_IMAGE_TAG_RESIDUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:img|picture|svg)[^>]*>?").unwrap());

static RE_BACKGROUND_IMAGE_RESIDUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)background-image\s*:").unwrap());

static RE_DATA_IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\s*\(\s*["']?data:image/[^)]+\)"#).unwrap()
});

/// Remove `<img>`, `<picture>` and `<svg>` elements, `background-image`
/// declarations, and inline base64 images (`url(data:image/...)` becomes `url()`)
///
/// Unpaired or unterminated `<picture`/`<svg`/`<img` openers lose the tag
/// itself; their content stays.
pub fn strip_images(html: &str) -> String {
    until_stable(html, strip_images_once)
}

fn strip_images_once(html: &str) -> String {
    let text = remove_all(&RE_IMG, html.to_string());
    let text = remove_all(&RE_PICTURE, text);
    let text = remove_all(&RE_SVG, text);
    let text = remove_all(&RE_BACKGROUND_IMAGE, text);
    let text = remove_all(&RE_IMAGE_TAG_RESIDUE, text);
    let text = remove_all(&RE_BACKGROUND_IMAGE_RESIDUE, text);
    replace_all(&RE_DATA_IMAGE_URL, text, "url()")
}

// ============================================================================
// Pass 2: document head
// ============================================================================

static RE_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<head\b[^>]*>.*?</head\s*>").unwrap());

const EMPTY_HEAD: &str = "<head></head>";

/// Replace the whole head section with an empty `<head></head>` pair
pub fn collapse_head(html: &str) -> String {
    until_stable(html, |text| replace_all(&RE_HEAD, text.to_string(), EMPTY_HEAD))
}

// ============================================================================
// Pass 3: inline spans
// ============================================================================

static RE_SPAN_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<span\b[^>]*>").unwrap());
static RE_SPAN_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</span\s*>").unwrap());

/// Drop `<span>` open/close tags, keeping everything between them
pub fn unwrap_spans(html: &str) -> String {
    until_stable(html, |text| {
        let text = remove_all(&RE_SPAN_OPEN, text.to_string());
        remove_all(&RE_SPAN_CLOSE, text)
    })
}

// ============================================================================
// Pass 4: presentational / identifying attributes
// ============================================================================

static RE_STYLE_ATTR: Lazy<Regex> = Lazy::new(|| attribute_regex("style"));
static RE_ID_ATTR: Lazy<Regex> = Lazy::new(|| attribute_regex("id"));
static RE_CLASS_ATTR: Lazy<Regex> = Lazy::new(|| attribute_regex("class"));
static RE_DATA_ATTR: Lazy<Regex> = Lazy::new(|| attribute_regex("data-[a-z0-9-]+"));

/// Remove `style`, `id`, `class` and `data-*` attributes
pub fn strip_attributes(html: &str) -> String {
    until_stable(html, |text| {
        let text = remove_all(&RE_STYLE_ATTR, text.to_string());
        let text = remove_all(&RE_ID_ATTR, text);
        let text = remove_all(&RE_CLASS_ATTR, text);
        remove_all(&RE_DATA_ATTR, text)
    })
}

// ============================================================================
// Pass 5: comments and outbound references
// ============================================================================

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

// An opener with no closer swallows the rest of the document
static RE_UNCLOSED_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*").unwrap());

static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:https?|ftp)://[^\s<>"']*"#).unwrap());

static RE_HREF_ATTR: Lazy<Regex> = Lazy::new(|| attribute_regex("href"));
static RE_SRC_ATTR: Lazy<Regex> = Lazy::new(|| attribute_regex("src"));

static RE_LINK_ATTR_RESIDUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:href|src)\s*=").unwrap());

/// Remove HTML comments, literal http/https/ftp URLs, and `href`/`src` attributes
///
/// An unterminated comment runs to the end of the document.
pub fn strip_comments_and_links(html: &str) -> String {
    until_stable(html, |text| {
        let text = remove_all(&RE_COMMENT, text.to_string());
        let text = remove_all(&RE_UNCLOSED_COMMENT, text);
        let text = remove_all(&RE_URL, text);
        let text = remove_all(&RE_HREF_ATTR, text);
        let text = remove_all(&RE_SRC_ATTR, text);
        remove_all(&RE_LINK_ATTR_RESIDUE, text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><head><title>t</title></head><body><img src="a.png"><span id="s">hi</span></body></html>"#;

    /// Forbidden tokens that must never survive the composed pipeline
    const FORBIDDEN: [&str; 10] = [
        "<img",
        "<picture",
        "<svg",
        "background-image:",
        "href=",
        "src=",
        "<!--",
        "http://",
        "https://",
        "ftp://",
    ];

    fn corpus() -> Vec<String> {
        let fragments = [
            r#"<img src="data:image/png;base64,AAAA">"#,
            r#"<IMG SRC='x.png' ALT="x"/>"#,
            "<picture><source srcset=\"a.webp\"><img src=\"a.png\"></picture>",
            "<svg width=\"10\"><circle r=\"4\"/></svg>",
            "<svg viewBox=\"0 0 1 1\"/>",
            r#"<div style="background-image: url(a.png); color: red">x</div>"#,
            r#"<div style='margin:0'>y</div>"#,
            "<p class=\"c1\" id=\"p1\" data-page-no=\"3\" data-x='y'>z</p>",
            "<span class=\"a\">A</span><SPAN>B</SPAN>",
            "<!-- generated\n by pdf2htmlEX -->",
            "<a href=\"https://example.com/x\">link</a> see http://foo.bar/baz",
            "<link rel=\"stylesheet\" href=\"base.css\">",
            "ftp://files.example.org/pub",
            "<head>\n<meta charset=\"utf-8\">\n<style>.x{}</style>\n</head>",
            "<im<span>g src=\"x.png\">",
            "<div\n  class=\"multi\nline\">w</div>",
            "plain text with no markup",
            "<svg width=\"1\"><circle/>",
            "<picture><source>",
            "<!-- unclosed",
            "see http:// now",
            "<a href=>x</a>",
            "<img",
            "<div style=\"background-image:\">",
            "<Imgx> a.href=b SRC = c",
        ];

        let mut docs: Vec<String> = fragments.iter().map(|s| s.to_string()).collect();
        for (i, a) in fragments.iter().enumerate() {
            for b in fragments.iter().skip(i) {
                docs.push(format!("<html>{}<body>{}{}</body></html>", fragments[13], a, b));
            }
        }
        docs.push(SAMPLE.to_string());
        docs
    }

    #[test]
    fn test_reference_document() {
        assert_eq!(
            sanitize(SAMPLE),
            "<html><head></head><body>hi</body></html>"
        );
    }

    #[test]
    fn test_strip_images() {
        let html = r#"<p>a<img src="x.png">b<picture><img></picture>c<svg><g/></svg>d</p>"#;
        assert_eq!(strip_images(html), "<p>abcd</p>");
    }

    #[test]
    fn test_strip_images_self_closing_svg_does_not_absorb_following_markup() {
        let html = r#"<svg x="1"/><p>keep</p><svg></svg>"#;
        assert_eq!(strip_images(html), "<p>keep</p>");
    }

    #[test]
    fn test_strip_images_empties_data_urls() {
        let html = r#"<div style="border-image: url('data:image/png,AAAA')">x</div>"#;
        assert_eq!(
            strip_images(html),
            r#"<div style="border-image: url()">x</div>"#
        );
    }

    #[test]
    fn test_strip_images_background_declaration() {
        let html = r#"<div style="background-image: url(a.png); color: red">x</div>"#;
        assert_eq!(strip_images(html), r#"<div style=" color: red">x</div>"#);
    }

    #[test]
    fn test_collapse_head_is_case_insensitive_and_multiline() {
        let html = "<HTML><HEAD lang=\"en\">\n<title>x</title>\n</HEAD><body>b</body></HTML>";
        assert_eq!(
            collapse_head(html),
            "<HTML><head></head><body>b</body></HTML>"
        );
    }

    #[test]
    fn test_collapse_head_leaves_header_element_alone() {
        let html = "<head><title>t</title></head><header>h</header>";
        assert_eq!(collapse_head(html), "<head></head><header>h</header>");
    }

    #[test]
    fn test_collapse_head_yields_single_empty_pair() {
        let html = "<html><head><meta a><script>s()</script></head><body><p>x</p></body></html>";
        let out = collapse_head(html);
        assert_eq!(out.matches("<head></head>").count(), 1);
        assert_eq!(out, "<html><head></head><body><p>x</p></body></html>");
    }

    #[test]
    fn test_unwrap_spans_preserves_content_and_order() {
        assert_eq!(unwrap_spans(r#"<span class="x">A</span>B"#), "AB");
        assert_eq!(
            unwrap_spans("<p><span>1<span>2</span>3</span></p>"),
            "<p>123</p>"
        );
    }

    #[test]
    fn test_unwrap_spans_ignores_similar_tags() {
        assert_eq!(unwrap_spans("<spanner>x</spanner>"), "<spanner>x</spanner>");
    }

    #[test]
    fn test_strip_attributes_all_quote_styles() {
        let html = r#"<p style="a:b" id='p' class=c data-page-no="1" data-x='2' title="keep">t</p>"#;
        assert_eq!(strip_attributes(html), r#"<p title="keep">t</p>"#);
    }

    #[test]
    fn test_strip_comments_and_links() {
        let html = "<!-- c --><a href=\"https://x.io/p?q=1\">go</a> http://a.b ftp://c.d <img src='y.png'>";
        assert_eq!(strip_comments_and_links(html), "<a>go</a>   <img>");
    }

    #[test]
    fn test_passes_are_individually_idempotent() {
        for doc in corpus() {
            for (name, pass) in PASSES {
                let once = pass(&doc);
                assert_eq!(pass(&once), once, "pass {} not idempotent on {:?}", name, doc);
            }
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for doc in corpus() {
            let once = sanitize(&doc);
            assert_eq!(sanitize(&once), once, "not idempotent on {:?}", doc);
        }
    }

    #[test]
    fn test_sanitize_removes_forbidden_tokens() {
        for doc in corpus() {
            let out = sanitize(&doc).to_ascii_lowercase();
            for token in FORBIDDEN {
                assert!(!out.contains(token), "{:?} survived in {:?}", token, out);
            }
        }
    }

    #[test]
    fn test_spliced_fragment_is_caught_on_next_round() {
        assert_eq!(sanitize("<im<span>g src=\"x.png\">"), "");
    }

    #[test]
    fn test_unterminated_and_empty_forms_are_removed() {
        let cases = [
            ("<svg width=\"1\"><circle/>", "<circle/>"),
            ("<picture><source>", "<source>"),
            ("<!-- unclosed", ""),
            ("<p>a</p><!-- rest <b>", "<p>a</p>"),
            ("see http:// now", "see  now"),
            ("<a href=>x</a>", "<a>x</a>"),
            ("<img", ""),
            ("x<IMG alt=\"y\"", "x"),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_passes_unmatched_input_through() {
        let text = "no markup here < > & just text";
        assert_eq!(sanitize(text), text);
        assert_eq!(sanitize(""), "");
    }
}
