//! End-to-end tests for document highlighting.

mod common;

use common::{assert_close, baseline, build_pdf, moveto_points, page_operations, FixturePage};
use pdfhighlight::{
    compile_literal, compile_pattern, process, process_bytes, DocumentProcessor, Error, HighlightOptions,
    PageEvent, PdfReader, Rgb,
};

fn invoice_pages() -> Vec<u8> {
    build_pdf(&[
        FixturePage::a4(&["Cover page", "Nothing to see"]),
        FixturePage::a4(&["Order 1182", "Invoice total 42.00", "Thank you"]),
        FixturePage::a4(&["Appendix"]),
    ])
}

#[test]
fn test_match_on_one_page_only() {
    let pattern = compile_pattern("Invoice", false).unwrap();
    let (bytes, summary) = process_bytes(&pattern, &invoice_pages()).unwrap();

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.highlights, 1);
    assert_eq!(summary.pages_with_matches, 1);

    let reader = PdfReader::from_bytes(&bytes).unwrap();
    assert_eq!(reader.page_count(), 3);
    assert!(moveto_points(&reader.page(1).unwrap()).is_empty());
    assert!(moveto_points(&reader.page(3).unwrap()).is_empty());

    let points = moveto_points(&reader.page(2).unwrap());
    assert_eq!(points.len(), 1);
    // Start point is x + radius on the bottom edge.
    assert_close(points[0].0, 13.0);
    assert_close(points[0].1, baseline(1) - 2.0);
}

#[test]
fn test_no_match_keeps_count_and_size() {
    let pattern = compile_pattern("zz", false).unwrap();
    let input = invoice_pages();
    let (bytes, summary) = process_bytes(&pattern, &input).unwrap();
    assert_eq!(summary.highlights, 0);

    let before = PdfReader::from_bytes(&input).unwrap();
    let after = PdfReader::from_bytes(&bytes).unwrap();
    assert_eq!(after.page_count(), before.page_count());
    for (old, new) in before.pages().zip(after.pages()) {
        let old_box = old.media_box().unwrap();
        let new_box = new.media_box().unwrap();
        assert_close(new_box.width(), old_box.width());
        assert_close(new_box.height(), old_box.height());
        assert!(moveto_points(&new).is_empty());
    }
}

#[test]
fn test_non_a4_media_box_round_trip() {
    let input = build_pdf(&[
        FixturePage {
            lines: &["Letter sized", "match here"],
            media_box: common::LETTER,
        },
        FixturePage {
            lines: &["Small page"],
            media_box: [0.0, 0.0, 200.0, 300.0],
        },
    ]);
    let pattern = compile_pattern("match|Small", false).unwrap();
    let (bytes, summary) = process_bytes(&pattern, &input).unwrap();
    assert_eq!(summary.highlights, 2);

    let reader = PdfReader::from_bytes(&bytes).unwrap();
    let letter = reader.page(1).unwrap().media_box().unwrap();
    assert_close(letter.width(), 612.0);
    assert_close(letter.height(), 792.0);
    let small = reader.page(2).unwrap().media_box().unwrap();
    assert_close(small.width(), 200.0);
    assert_close(small.height(), 300.0);
}

#[test]
fn test_zero_page_input() {
    let input = build_pdf(&[]);
    let pattern = compile_pattern("ab", false).unwrap();
    let (bytes, summary) = process_bytes(&pattern, &input).unwrap();

    assert_eq!(summary.pages, 0);
    let reader = PdfReader::from_bytes(&bytes).unwrap();
    assert_eq!(reader.page_count(), 0);
}

#[test]
fn test_original_content_painted_over_highlight() {
    let pattern = compile_pattern("total", false).unwrap();
    let (bytes, _) = process_bytes(&pattern, &invoice_pages()).unwrap();
    let reader = PdfReader::from_bytes(&bytes).unwrap();
    let page = reader.page(2).unwrap();

    let operators: Vec<String> = page_operations(&page)
        .into_iter()
        .map(|op| op.operator)
        .collect();
    let fill = operators.iter().position(|op| op == "f").unwrap();
    let text = operators.iter().position(|op| op == "Tj").unwrap();
    assert!(fill < text);

    // The output text is still searchable.
    let texts: Vec<String> = page
        .text_runs()
        .unwrap()
        .map(|run| run.unwrap().text)
        .collect();
    assert_eq!(texts, ["Order 1182", "Invoice total 42.00", "Thank you"]);
}

#[test]
fn test_every_matching_line_highlighted() {
    let input = build_pdf(&[FixturePage::a4(&[
        "error: disk full",
        "ok",
        "error: retry",
        "warning",
    ])]);
    let pattern = compile_pattern(r"^error:", false).unwrap();
    let (bytes, summary) = process_bytes(&pattern, &input).unwrap();
    assert_eq!(summary.highlights, 2);

    let reader = PdfReader::from_bytes(&bytes).unwrap();
    let ys: Vec<f32> = moveto_points(&reader.page(1).unwrap())
        .into_iter()
        .map(|(_, y)| y)
        .collect();
    assert_eq!(ys.len(), 2);
    assert_close(ys[0], baseline(0) - 2.0);
    assert_close(ys[1], baseline(2) - 2.0);
}

#[test]
fn test_ignore_case() {
    let input = build_pdf(&[FixturePage::a4(&["TOTAL DUE"])]);

    let sensitive = compile_pattern("total", false).unwrap();
    assert_eq!(process_bytes(&sensitive, &input).unwrap().1.highlights, 0);

    let insensitive = compile_pattern("total", true).unwrap();
    assert_eq!(process_bytes(&insensitive, &input).unwrap().1.highlights, 1);
}

#[test]
fn test_custom_color() {
    let input = build_pdf(&[FixturePage::a4(&["match"])]);
    let pattern = compile_pattern("match", false).unwrap();
    let options = HighlightOptions::new().with_color(Rgb::from_hex("#00ff00").unwrap());

    let (bytes, _) = DocumentProcessor::with_options(options)
        .process_bytes(&pattern, &input)
        .unwrap();
    let reader = PdfReader::from_bytes(&bytes).unwrap();
    let ops = page_operations(&reader.page(1).unwrap());
    let rg = ops.iter().find(|op| op.operator == "rg").unwrap();
    let channels: Vec<f32> = rg
        .operands
        .iter()
        .map(|o| pdfhighlight::model::number(o).unwrap())
        .collect();
    assert_eq!(channels, [0.0, 1.0, 0.0]);
}

#[test]
fn test_observer_sees_every_page() {
    let pattern = compile_pattern("Invoice", false).unwrap();
    let mut events: Vec<PageEvent> = Vec::new();
    DocumentProcessor::new()
        .on_page(|event| events.push(*event))
        .process_bytes(&pattern, &invoice_pages())
        .unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(events[1], PageEvent { page: 2, total: 3, highlights: 1 });
    assert!(events.iter().all(|e| e.total == 3));
}

#[test]
fn test_process_file_overwrites_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    std::fs::write(&input, invoice_pages()).unwrap();
    std::fs::write(&output, b"previous contents").unwrap();

    let pattern = compile_pattern("Invoice", false).unwrap();
    let summary = process(&pattern, &input, &output).unwrap();
    assert_eq!(summary.pages, 3);

    let reader = PdfReader::open(&output).unwrap();
    assert_eq!(reader.page_count(), 3);
}

#[test]
fn test_invalid_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("out.pdf");
    std::fs::write(&input, b"this is not a pdf").unwrap();

    let pattern = compile_pattern("ab", false).unwrap();
    let result = process(&pattern, &input, &output);
    assert!(matches!(result, Err(Error::UnknownFormat)));
    assert!(!output.exists());
}

#[test]
fn test_invalid_color_message() {
    let err = Rgb::from_hex("yellow").unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Only six-digit hex colors are allowed prefixed with #."));
}

#[test]
fn test_literal_search_matches_exact_text() {
    let input = build_pdf(&[FixturePage::a4(&["a.b", "axb", "a-b"])]);

    let regex = compile_pattern("a.b", false).unwrap();
    assert_eq!(process_bytes(&regex, &input).unwrap().1.highlights, 3);

    let literal = compile_literal("a.b", false).unwrap();
    let (bytes, summary) = process_bytes(&literal, &input).unwrap();
    assert_eq!(summary.highlights, 1);

    let reader = PdfReader::from_bytes(&bytes).unwrap();
    let points = moveto_points(&reader.page(1).unwrap());
    assert_eq!(points.len(), 1);
    assert_close(points[0].1, baseline(0) - 2.0);
}

#[test]
fn test_shared_font_copied_once() {
    let lines: Vec<String> = (0..20).map(|i| format!("Hello World {i}")).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let pages: Vec<FixturePage<'_>> = line_refs.chunks(1).map(|line| FixturePage::a4(line)).collect();
    let input = build_pdf(&pages);

    let pattern = compile_pattern("World", false).unwrap();
    let (bytes, summary) = process_bytes(&pattern, &input).unwrap();
    assert_eq!(summary.pages, 20);

    let reader = PdfReader::from_bytes(&bytes).unwrap();
    let doc = reader.raw_doc();
    let mut font_ids: Vec<lopdf::ObjectId> = reader
        .pages()
        .map(|page| {
            let resources = page.resources().unwrap().unwrap();
            let fonts = match resources.get(b"Font").unwrap() {
                lopdf::Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
                other => other.as_dict().unwrap(),
            };
            fonts.get(b"F1").unwrap().as_reference().unwrap()
        })
        .collect();
    font_ids.dedup();
    assert_eq!(font_ids.len(), 1);
}
