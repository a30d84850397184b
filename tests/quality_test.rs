use wxr2md::quality::{count_words, has_embeds, has_images, is_embed_heavy, text_to_markup_ratio};
use wxr2md::{analyze_quality, FilteringOptions, PageType, RawPostRecord};

fn prose(words: usize) -> String {
    (0..words).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

fn lenient() -> FilteringOptions {
    FilteringOptions {
        filter_enabled: true,
        min_word_count: 0,
        min_text_to_markup_ratio: 0.0,
        ..FilteringOptions::default()
    }
}

#[test]
fn word_counts_match_reference_examples() {
    assert_eq!(count_words("<p>Hello world</p>"), 2);
    assert_eq!(count_words("<div><h1>Test</h1><p>One two three</p></div>"), 4);
}

#[test]
fn tags_do_not_merge_adjacent_words() {
    assert_eq!(count_words("one<br>two<span>three</span>"), 3);
    assert_eq!(count_words("don't stop&nbsp;now"), 4);
    assert_eq!(count_words("<p>--- ... !!!</p>"), 0);
}

#[test]
fn ratio_stays_in_unit_interval() {
    let samples = [
        "",
        "plain text only",
        "<p></p>",
        "<p>text</p>",
        "   <br/>   ",
        "<img src=\"x.jpg\"/>",
        "a < b > c",
        "<!-- comment --><p>café au lait</p>",
    ];
    for html in samples {
        let ratio = text_to_markup_ratio(html);
        assert!((0.0..=1.0).contains(&ratio), "{html:?} gave {ratio}");
    }
    assert_eq!(text_to_markup_ratio(""), 0.0);
    assert_eq!(text_to_markup_ratio("plain text only"), 1.0);
}

#[test]
fn interior_tags_do_not_raise_the_ratio() {
    let wrapped = "<p>word</p>".repeat(10);
    let ratio = text_to_markup_ratio(&wrapped);
    assert!(ratio < 0.5, "{ratio}");

    let options = FilteringOptions {
        min_word_count: 0,
        min_text_to_markup_ratio: 0.5,
        ..lenient()
    };
    assert!(analyze_quality(&wrapped, &options, None).is_low_value);

    // Same text with one wrapper scores higher than ten wrappers.
    let single = format!("<p>{}</p>", "word".repeat(10));
    assert!(text_to_markup_ratio(&single) > ratio);
}

#[test]
fn metrics_agree_with_embed_heavy_helper() {
    for html in [
        r#"<iframe src="x"></iframe>"#.to_string(),
        format!("<p>{}</p><iframe src=\"x\"></iframe>", prose(200)),
        "<p>no embeds</p>".to_string(),
    ] {
        let metrics = analyze_quality(&html, &lenient(), None);
        assert_eq!(metrics.is_embed_heavy, is_embed_heavy(&html), "{html}");
    }
}

#[test]
fn image_detection() {
    assert!(has_images(r#"<img src="x.jpg"/>"#));
    assert!(has_images(r#"<P><IMG SRC="x.jpg"></P>"#));
    assert!(!has_images("<p>none</p>"));
    assert!(!has_images("<p>imagery without tags</p>"));
}

#[test]
fn embed_heavy_depends_on_body_length() {
    let iframe = r#"<iframe src="x"></iframe>"#;
    assert!(has_embeds(iframe));
    assert!(is_embed_heavy(iframe));

    let long = format!("<p>{}</p>{iframe}", prose(200));
    assert!(long.len() >= 1000);
    assert!(has_embeds(&long));
    assert!(!is_embed_heavy(&long));

    assert!(is_embed_heavy(r#"<object data="movie.swf"></object>"#));
    assert!(is_embed_heavy(r#"<embed src="clip.mp4">"#));
}

#[test]
fn analysis_is_idempotent() {
    let html = format!("<p>{}</p><img src=\"a.jpg\">", prose(40));
    let post = RawPostRecord {
        title: "Page 2".into(),
        ..RawPostRecord::default()
    };
    let options = FilteringOptions::default();
    let first = analyze_quality(&html, &options, Some(&post));
    let second = analyze_quality(&html, &options, Some(&post));
    assert_eq!(first, second);
    assert_eq!(
        first.text_to_markup_ratio.to_bits(),
        second.text_to_markup_ratio.to_bits()
    );
}

#[test]
fn each_threshold_makes_a_post_low_value() {
    let html = format!("<p>{}</p>", prose(50));
    assert!(!analyze_quality(&html, &lenient(), None).is_low_value);

    let words = FilteringOptions { min_word_count: 51, ..lenient() };
    assert!(analyze_quality(&html, &words, None).is_low_value);

    let ratio = FilteringOptions { min_text_to_markup_ratio: 0.999, ..lenient() };
    assert!(analyze_quality(&html, &ratio, None).is_low_value);

    let images = FilteringOptions { exclude_no_images: true, ..lenient() };
    assert!(analyze_quality(&html, &images, None).is_low_value);

    let embed = r#"<iframe src="https://player.example/1"></iframe>"#;
    assert!(analyze_quality(embed, &lenient(), None).is_low_value);
    let keep_embeds = FilteringOptions { exclude_embed_only_posts: false, ..lenient() };
    assert!(!analyze_quality(embed, &keep_embeds, None).is_low_value);
}

#[test]
fn system_page_exclusion_overrides_quality() {
    let html = format!("<p>{}</p>", prose(900));
    let post = RawPostRecord {
        title: "Tag: Example".into(),
        post_type: "page".into(),
        ..RawPostRecord::default()
    };

    let metrics = analyze_quality(&html, &lenient(), Some(&post));
    assert!(metrics.is_low_value);
    assert_eq!(metrics.page_type, Some(PageType::Tag));
    assert_eq!(metrics.word_count, 900);

    let keep_tags = FilteringOptions { exclude_tag_pages: false, ..lenient() };
    let metrics = analyze_quality(&html, &keep_tags, Some(&post));
    assert!(!metrics.is_low_value);
    assert_eq!(metrics.page_type, Some(PageType::Tag));
}

#[test]
fn without_a_post_no_page_type_is_reported() {
    let metrics = analyze_quality("<p>Page 2</p>", &lenient(), None);
    assert_eq!(metrics.page_type, None);
}
