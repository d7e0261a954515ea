use super::*;

const PREAMBLE: &str = "diff --git a/x.txt b/x.txt\n\
index 4a58007..8e4a5b6 100644\n\
--- a/x.txt\n\
+++ b/x.txt\n";

fn patch(body: &str) -> String {
    format!("{}{}", PREAMBLE, body)
}

#[test]
fn test_single_line_add() {
    let patch_text = patch("@@ -1 +1,2 @@\n alpha\n+beta\n");
    let hunks = parse_hunks("x.txt", &patch_text, "alpha\nbeta\n").unwrap();

    assert_eq!(hunks.len(), 1);
    let hunk = &hunks[0];
    assert_eq!(hunk.old_start_line, 1);
    assert_eq!(hunk.old_line_count, 1);
    assert_eq!(hunk.new_start_line, 1);
    assert_eq!(hunk.new_line_count, 2);
    assert_eq!(hunk.header_text, "@@ -1 +1,2 @@");
    assert_eq!(hunk.section_heading, None);
    assert_eq!(hunk.body_text, " alpha\n+beta\n");
    assert_eq!(hunk.new_file_slice, "alpha\nbeta\n");
}

#[test]
fn test_multiple_hunks_in_order() {
    let content: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
    let patch_text = patch(
        "@@ -2,3 +2,3 @@ fn first()\n line 2\n-old 3\n+line 3\n line 4\n\
         @@ -15,3 +15,4 @@\n line 15\n line 16\n+line 17\n line 18\n",
    );

    let hunks = parse_hunks("x.txt", &patch_text, &content).unwrap();
    assert_eq!(hunks.len(), 2);

    assert_eq!(hunks[0].section_heading.as_deref(), Some("fn first()"));
    assert_eq!(hunks[0].header_text, "@@ -2,3 +2,3 @@ fn first()");
    assert_eq!(hunks[0].new_file_slice, "line 2\nline 3\nline 4\n");

    assert_eq!(hunks[1].new_line_range(), 15..19);
    assert_eq!(hunks[1].new_file_slice, "line 15\nline 16\nline 17\nline 18\n");
    assert!(hunks[0].new_start_line < hunks[1].new_start_line);
}

#[test]
fn test_pure_deletion_hunk_has_empty_slice() {
    let patch_text = patch("@@ -2 +1,0 @@\n-beta\n");
    let hunks = parse_hunks("x.txt", &patch_text, "alpha\n").unwrap();

    assert_eq!(hunks.len(), 1);
    assert_eq!(hunks[0].new_line_count, 0);
    assert_eq!(hunks[0].old_line_range(), 2..3);
    assert_eq!(hunks[0].new_file_slice, "");
}

#[test]
fn test_file_emptied_entirely() {
    let patch_text = patch("@@ -1,2 +0,0 @@\n-alpha\n-beta\n");
    let hunks = parse_hunks("x.txt", &patch_text, "").unwrap();
    assert_eq!(hunks[0].new_start_line, 0);
    assert_eq!(hunks[0].new_file_slice, "");
}

#[test]
fn test_no_newline_marker_kept_in_body() {
    let patch_text = patch(
        "@@ -1,2 +1,2 @@\n alpha\n-beta\n\\ No newline at end of file\n+gamma\n\\ No newline at end of file\n",
    );
    let hunks = parse_hunks("x.txt", &patch_text, "alpha\ngamma").unwrap();

    let hunk = &hunks[0];
    assert_eq!(hunk.old_line_count, 2);
    assert_eq!(hunk.new_line_count, 2);
    assert!(hunk.body_text.contains("\\ No newline at end of file\n"));
    assert_eq!(hunk.new_file_slice, "alpha\ngamma");
    assert_eq!(
        hunk.lines().filter(|l| *l == HunkLine::NoNewline).count(),
        2
    );
}

#[test]
fn test_crlf_content_is_preserved() {
    let patch_text = patch("@@ -1 +1,2 @@\n alpha\r\n+beta\r\n");
    let hunks = parse_hunks("x.txt", &patch_text, "alpha\r\nbeta\r\n").unwrap();
    assert_eq!(hunks[0].body_text, " alpha\r\n+beta\r\n");
    assert_eq!(hunks[0].new_file_slice, "alpha\r\nbeta\r\n");
}

#[test]
fn test_rename_preamble_without_hunks() {
    let patch_text = "diff --git a/old.txt b/new.txt\n\
                      similarity index 100%\n\
                      rename from old.txt\n\
                      rename to new.txt\n";
    let hunks = parse_hunks("new.txt", patch_text, "same\n").unwrap();
    assert!(hunks.is_empty());
}

#[test]
fn test_binary_patch_yields_no_hunks() {
    let patch_text = "diff --git a/img.png b/img.png\n\
                      index 1111111..2222222 100644\n\
                      Binary files a/img.png and b/img.png differ\n";
    assert!(parse_hunks("img.png", patch_text, "\u{fffd}PNG").unwrap().is_empty());

    let git_binary = "diff --git a/img.png b/img.png\nGIT binary patch\nliteral 4\n";
    assert!(parse_hunks("img.png", git_binary, "").unwrap().is_empty());
}

#[test]
fn test_malformed_header_fails() {
    let patch_text = patch("@@ -x +1 @@\n+alpha\n");
    let err = parse_hunks("x.txt", &patch_text, "alpha\n").unwrap_err();
    assert!(matches!(err, PatchError::InvalidHeader { ref header, .. } if header == "@@ -x +1 @@"));
}

#[test]
fn test_count_mismatch_fails() {
    let patch_text = patch("@@ -1 +1,3 @@\n alpha\n+beta\n");
    let err = parse_hunks("x.txt", &patch_text, "alpha\nbeta\ngamma\n").unwrap_err();
    assert!(matches!(
        err,
        PatchError::CountMismatch {
            side: "new",
            expected: 3,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_old_count_mismatch_fails() {
    let patch_text = patch("@@ -1,2 +1 @@\n alpha\n");
    let err = parse_hunks("x.txt", &patch_text, "alpha\n").unwrap_err();
    assert!(matches!(err, PatchError::CountMismatch { side: "old", .. }));
}

#[test]
fn test_slice_out_of_bounds_fails() {
    let patch_text = patch("@@ -1 +1,2 @@\n alpha\n+beta\n");
    let err = parse_hunks("x.txt", &patch_text, "alpha\n").unwrap_err();
    assert!(matches!(
        err,
        PatchError::SliceOutOfBounds {
            end: 2,
            available: 1,
            ..
        }
    ));
}

#[test]
fn test_start_line_near_usize_max_fails_cleanly() {
    let header = format!("@@ -0,0 +{},2 @@", usize::MAX);
    let patch_text = patch(&format!("{}\n+a\n+b\n", header));
    let err = parse_hunks("x.txt", &patch_text, "a\nb\n").unwrap_err();
    assert!(matches!(
        err,
        PatchError::SliceOutOfBounds {
            end: usize::MAX,
            available: 2,
            ..
        }
    ));
}

#[test]
fn test_start_line_beyond_usize_is_invalid_header() {
    let patch_text = patch("@@ -0,0 +99999999999999999999999,1 @@\n+a\n");
    let err = parse_hunks("x.txt", &patch_text, "a\n").unwrap_err();
    assert!(matches!(err, PatchError::InvalidHeader { .. }));
}

#[test]
fn test_unexpected_body_line_fails() {
    let patch_text = patch("@@ -1 +1 @@\n alpha\n?stray\n");
    let err = parse_hunks("x.txt", &patch_text, "alpha\n").unwrap_err();
    assert!(matches!(err, PatchError::UnexpectedLine { ref line, .. } if line == "?stray"));
}

#[test]
fn test_error_on_later_hunk_discards_earlier_ones() {
    let patch_text = patch("@@ -1 +1 @@\n-a\n+b\n@@ -9 +9 @@\n-y\n+z\n");
    let result = parse_hunks("x.txt", &patch_text, "b\n");
    assert!(matches!(result, Err(PatchError::SliceOutOfBounds { .. })));
}

#[test]
fn test_hunks_render_back_to_patch_text() {
    let body = "@@ -1,2 +1,2 @@ heading\n a\n-b\n+c\n@@ -10 +10,2 @@\n j\n+k\n";
    let patch_text = patch(body);
    let content: String = ["a", "c", "3", "4", "5", "6", "7", "8", "9", "j", "k"]
        .iter()
        .map(|l| format!("{}\n", l))
        .collect();

    let hunks = parse_hunks("x.txt", &patch_text, &content).unwrap();
    let rendered: String = hunks.iter().map(CodeHunk::to_patch_text).collect();
    assert_eq!(format!("{}{}", PREAMBLE, rendered), patch_text);

    let reparsed = parse_hunks("x.txt", &patch_text, &content).unwrap();
    assert_eq!(hunks, reparsed);
}

#[test]
fn test_added_and_removed_lines() {
    let patch_text = patch("@@ -1,2 +1,2 @@\n keep\n-gone\n+here\n");
    let hunks = parse_hunks("x.txt", &patch_text, "keep\nhere\n").unwrap();
    let added: Vec<&str> = hunks[0].added_lines().collect();
    let removed: Vec<&str> = hunks[0].removed_lines().collect();
    assert_eq!(added, vec!["here\n"]);
    assert_eq!(removed, vec!["gone\n"]);
}

#[test]
fn test_body_counts_match_header() {
    let patch_text = patch("@@ -3,4 +3,5 @@\n c\n-d\n+D\n+E\n e\n f\n");
    let content = "a\nb\nc\nD\nE\ne\nf\n";
    for hunk in parse_hunks("x.txt", &patch_text, content).unwrap() {
        let new_side = hunk
            .lines()
            .filter(|l| matches!(l, HunkLine::Context(_) | HunkLine::Added(_)))
            .count();
        let old_side = hunk
            .lines()
            .filter(|l| matches!(l, HunkLine::Context(_) | HunkLine::Removed(_)))
            .count();
        assert_eq!(new_side, hunk.new_line_count);
        assert_eq!(old_side, hunk.old_line_count);
    }
}
