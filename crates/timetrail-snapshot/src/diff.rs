//! Change scoring and diff rendering.
//!
//! Two independent measures are computed for every save:
//!
//! - [`change_magnitude`] is a cheap positional line scan. Line `i` of the old
//!   text is compared with line `i` of the new text, so an insertion near the
//!   top counts every following line as changed. Aggregated numbers depend on
//!   this exact behavior.
//! - [`render`] is a line diff refined to characters inside each changed
//!   hunk (Myers), cleaned up into readable chunks and rendered as
//!   self-contained HTML. The work spent on character diffs is bounded by
//!   input size alone, so large rewrites stay fast and output stays
//!   deterministic.

use similar::{Algorithm, ChangeTag, TextDiff};

const INSERT_OPEN: &str = "<ins style=\"background:#e6ffe6;\">";
const DELETE_OPEN: &str = "<del style=\"background:#ffe6e6;\">";

/// Number of line positions whose text differs, without any floor.
///
/// Lines are split on `'\n'`; a position past the end of either text compares
/// as an empty line.
pub fn differing_lines(old: &str, new: &str) -> usize {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let positions = old_lines.len().max(new_lines.len());

    (0..positions)
        .filter(|&i| {
            let old_line = old_lines.get(i).copied().unwrap_or("");
            let new_line = new_lines.get(i).copied().unwrap_or("");
            old_line != new_line
        })
        .count()
}

/// Change score for a save, never less than 1.
///
/// An empty `old` (no prior snapshot) always scores exactly 1, whatever the
/// size of the new text.
pub fn change_magnitude(old: &str, new: &str) -> usize {
    if old.is_empty() {
        return 1;
    }
    differing_lines(old, new).max(1)
}

/// Render the difference between two texts as HTML.
///
/// Inserted text is wrapped in `<ins>`, deleted text in `<del>` and unchanged
/// text in `<span>`. The output depends only on the inputs.
pub fn render(old: &str, new: &str) -> String {
    let mut fragments = diff_fragments(old, new);
    cleanup_semantic(&mut fragments);
    to_html(&fragments)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    tag: ChangeTag,
    text: String,
}

impl Fragment {
    fn new(tag: ChangeTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}

/// Upper bound on the estimated work of all character diffs in one render.
///
/// Myers is `O((n + m) * d)`; a hunk of `n + m` characters is charged
/// `(n + m)^2`. Hunks that no longer fit are paired line by line, and line
/// pairs that do not fit are shown as whole-line replacements.
const CHAR_DIFF_BUDGET: u64 = 16_000_000;

/// Line diff first, then character diffs inside changed hunks.
fn diff_fragments(old: &str, new: &str) -> Vec<Fragment> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(old, new);

    let mut fragments = Vec::new();
    let mut budget = CHAR_DIFF_BUDGET;
    let mut hunk = Hunk::default();

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                hunk.flush(&mut fragments, &mut budget);
                push_text(&mut fragments, ChangeTag::Equal, change.value());
            }
            ChangeTag::Delete => hunk.old.push(change.value()),
            ChangeTag::Insert => hunk.new.push(change.value()),
        }
    }
    hunk.flush(&mut fragments, &mut budget);

    fragments
}

/// Consecutive deleted and inserted lines between two equal lines.
#[derive(Default)]
struct Hunk<'a> {
    old: Vec<&'a str>,
    new: Vec<&'a str>,
}

impl Hunk<'_> {
    fn flush(&mut self, fragments: &mut Vec<Fragment>, budget: &mut u64) {
        if self.old.is_empty() && self.new.is_empty() {
            return;
        }

        let old: String = self.old.concat();
        let new: String = self.new.concat();
        if try_charge(budget, &old, &new) {
            char_diff_into(fragments, &old, &new);
        } else {
            let pairs = self.old.len().max(self.new.len());
            for i in 0..pairs {
                let old_line = self.old.get(i).copied().unwrap_or("");
                let new_line = self.new.get(i).copied().unwrap_or("");
                if try_charge(budget, old_line, new_line) {
                    char_diff_into(fragments, old_line, new_line);
                } else {
                    push_text(fragments, ChangeTag::Delete, old_line);
                    push_text(fragments, ChangeTag::Insert, new_line);
                }
            }
        }

        self.old.clear();
        self.new.clear();
    }
}

fn try_charge(budget: &mut u64, old: &str, new: &str) -> bool {
    let size = (old.len() + new.len()) as u64;
    let cost = size.saturating_mul(size);
    if cost > *budget {
        return false;
    }
    *budget -= cost;
    true
}

fn char_diff_into(fragments: &mut Vec<Fragment>, old: &str, new: &str) {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(old, new);
    for change in diff.iter_all_changes() {
        push_text(fragments, change.tag(), change.value());
    }
}

fn push_text(fragments: &mut Vec<Fragment>, tag: ChangeTag, text: &str) {
    if text.is_empty() {
        return;
    }
    match fragments.last_mut() {
        Some(last) if last.tag == tag => last.text.push_str(text),
        _ => fragments.push(Fragment::new(tag, text)),
    }
}

/// Normalized view: edit runs and equalities alternate.
enum Segment {
    Equal(String),
    Edit(EditRun),
}

/// One deletion plus one insertion, with their lengths in chars.
#[derive(Debug, Default)]
struct EditRun {
    deleted: String,
    inserted: String,
    deleted_len: usize,
    inserted_len: usize,
}

impl EditRun {
    fn push(&mut self, tag: ChangeTag, text: &str) {
        match tag {
            ChangeTag::Delete => {
                self.deleted.push_str(text);
                self.deleted_len += text.chars().count();
            }
            ChangeTag::Insert => {
                self.inserted.push_str(text);
                self.inserted_len += text.chars().count();
            }
            ChangeTag::Equal => {}
        }
    }

    fn absorb(&mut self, equal: &str, next: EditRun) {
        let len = equal.chars().count();
        self.deleted.push_str(equal);
        self.deleted.push_str(&next.deleted);
        self.inserted.push_str(equal);
        self.inserted.push_str(&next.inserted);
        self.deleted_len += len + next.deleted_len;
        self.inserted_len += len + next.inserted_len;
    }

    fn largest(&self) -> usize {
        self.deleted_len.max(self.inserted_len)
    }
}

fn segments(fragments: Vec<Fragment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        if fragment.text.is_empty() {
            continue;
        }
        match (fragment.tag, out.last_mut()) {
            (ChangeTag::Equal, Some(Segment::Equal(text))) => text.push_str(&fragment.text),
            (ChangeTag::Equal, _) => out.push(Segment::Equal(fragment.text)),
            (tag, Some(Segment::Edit(run))) => run.push(tag, &fragment.text),
            (tag, _) => {
                let mut run = EditRun::default();
                run.push(tag, &fragment.text);
                out.push(Segment::Edit(run));
            }
        }
    }
    out
}

fn to_fragments(segments: Vec<Segment>) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(segments.len() * 2);
    for segment in segments {
        match segment {
            Segment::Equal(text) => out.push(Fragment::new(ChangeTag::Equal, text)),
            Segment::Edit(run) => {
                if !run.deleted.is_empty() {
                    out.push(Fragment::new(ChangeTag::Delete, run.deleted));
                }
                if !run.inserted.is_empty() {
                    out.push(Fragment::new(ChangeTag::Insert, run.inserted));
                }
            }
        }
    }
    out
}

/// Fold short equalities into the edits around them.
///
/// An equality that is no longer than the larger edit on each of its sides is
/// noise (`c<del>a</del><ins>o</ins>t` style interleaving) and reads better as
/// part of one bigger replacement. Single pass over a stack: every fold
/// removes an equality, and a grown edit is rechecked against the equality
/// before it.
fn cleanup_semantic(fragments: &mut Vec<Fragment>) {
    let mut stack: Vec<Segment> = Vec::new();

    for segment in segments(std::mem::take(fragments)) {
        stack.push(segment);
        while let Some(folded) = fold_tail(&mut stack) {
            stack.push(folded);
        }
    }

    *fragments = to_fragments(stack);
}

/// If the stack ends in `edit, short equality, edit`, pop all three and
/// return the merged edit.
fn fold_tail(stack: &mut Vec<Segment>) -> Option<Segment> {
    let n = stack.len();
    if n < 3 {
        return None;
    }
    let foldable = match (&stack[n - 3], &stack[n - 2], &stack[n - 1]) {
        (Segment::Edit(before), Segment::Equal(equal), Segment::Edit(after)) => {
            let len = equal.chars().count();
            len <= before.largest() && len <= after.largest()
        }
        _ => false,
    };
    if !foldable {
        return None;
    }

    let (Some(Segment::Edit(after)), Some(Segment::Equal(equal)), Some(Segment::Edit(mut before))) =
        (stack.pop(), stack.pop(), stack.pop())
    else {
        return None;
    };
    before.absorb(&equal, after);
    Some(Segment::Edit(before))
}

fn to_html(fragments: &[Fragment]) -> String {
    let mut html = String::new();
    for fragment in fragments {
        let (open, close) = match fragment.tag {
            ChangeTag::Insert => (INSERT_OPEN, "</ins>"),
            ChangeTag::Delete => (DELETE_OPEN, "</del>"),
            ChangeTag::Equal => ("<span>", "</span>"),
        };
        html.push_str(open);
        escape_into(&mut html, &fragment.text);
        html.push_str(close);
    }
    html
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("&para;<br>"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(old: &str, new: &str) -> Vec<Fragment> {
        let mut fragments = diff_fragments(old, new);
        cleanup_semantic(&mut fragments);
        fragments
    }

    fn side(fragments: &[Fragment], skip: ChangeTag) -> String {
        fragments
            .iter()
            .filter(|f| f.tag != skip)
            .map(|f| f.text.as_str())
            .collect()
    }

    #[test]
    fn first_save_scores_one_regardless_of_size() {
        let big = "line\n".repeat(500);
        assert_eq!(change_magnitude("", &big), 1);
        assert_eq!(change_magnitude("", ""), 1);
    }

    #[test]
    fn identical_text_has_no_differing_lines_but_floors_to_one() {
        let text = "a\nb\nc";
        assert_eq!(differing_lines(text, text), 0);
        assert_eq!(change_magnitude(text, text), 1);
    }

    #[test]
    fn counts_changed_positions() {
        assert_eq!(change_magnitude("a\nb\nc", "a\nB\nc"), 1);
        assert_eq!(change_magnitude("a\nb\nc", "A\nB\nC"), 3);
    }

    #[test]
    fn insertion_at_top_shifts_every_following_line() {
        // Positional, not aligned: x/a, a/b, b/c, c/<missing>
        assert_eq!(change_magnitude("a\nb\nc", "x\na\nb\nc"), 4);
    }

    #[test]
    fn missing_lines_compare_as_empty() {
        assert_eq!(differing_lines("a\nb", "a"), 1);
        // "a\n" splits into ["a", ""], so the trailing empty line matches a missing one
        assert_eq!(differing_lines("a\n", "a"), 0);
    }

    #[test]
    fn render_marks_simple_replacement() {
        let html = render("abc", "abd");
        assert_eq!(
            html,
            "<span>ab</span>\
             <del style=\"background:#ffe6e6;\">c</del>\
             <ins style=\"background:#e6ffe6;\">d</ins>"
        );
    }

    #[test]
    fn render_pure_insertion() {
        let html = render("hello", "hello world");
        assert_eq!(
            html,
            "<span>hello</span><ins style=\"background:#e6ffe6;\"> world</ins>"
        );
    }

    #[test]
    fn render_escapes_payload() {
        let html = render("a<b>&c", "a<b>&d");
        assert!(html.starts_with("<span>a&lt;b&gt;&amp;</span>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn render_marks_newlines() {
        let html = render("one\ntwo", "one\nthree");
        assert!(html.starts_with("<span>one&para;<br>t</span>"));
    }

    #[test]
    fn render_is_deterministic() {
        let old = "fn main() {\n    println!(\"hi\");\n}\n";
        let new = "fn main() {\n    let x = 1;\n    println!(\"{x}\");\n}\n";
        assert_eq!(render(old, new), render(old, new));
    }

    #[test]
    fn short_equality_between_edits_is_folded() {
        let mut fragments = vec![
            Fragment::new(ChangeTag::Delete, "ab"),
            Fragment::new(ChangeTag::Insert, "cd"),
            Fragment::new(ChangeTag::Equal, "e"),
            Fragment::new(ChangeTag::Delete, "fg"),
            Fragment::new(ChangeTag::Insert, "hi"),
        ];
        cleanup_semantic(&mut fragments);
        assert_eq!(
            fragments,
            vec![
                Fragment::new(ChangeTag::Delete, "abefg"),
                Fragment::new(ChangeTag::Insert, "cdehi"),
            ]
        );
    }

    #[test]
    fn long_equality_between_edits_is_kept() {
        let original = vec![
            Fragment::new(ChangeTag::Delete, "a"),
            Fragment::new(ChangeTag::Equal, "long shared text"),
            Fragment::new(ChangeTag::Insert, "b"),
        ];
        let mut fragments = original.clone();
        cleanup_semantic(&mut fragments);
        assert_eq!(fragments, original);
    }

    #[test]
    fn edge_equalities_are_kept() {
        let mut fragments = vec![
            Fragment::new(ChangeTag::Equal, "x"),
            Fragment::new(ChangeTag::Insert, "yyyy"),
            Fragment::new(ChangeTag::Equal, "z"),
        ];
        cleanup_semantic(&mut fragments);
        assert_eq!(fragments.len(), 3);
    }

    #[test]
    fn cleanup_orders_deletions_first() {
        let mut fragments = vec![
            Fragment::new(ChangeTag::Insert, "1"),
            Fragment::new(ChangeTag::Delete, "2"),
            Fragment::new(ChangeTag::Insert, "3"),
            Fragment::new(ChangeTag::Equal, "="),
            Fragment::new(ChangeTag::Equal, "="),
        ];
        cleanup_semantic(&mut fragments);
        assert_eq!(
            fragments,
            vec![
                Fragment::new(ChangeTag::Delete, "2"),
                Fragment::new(ChangeTag::Insert, "13"),
                Fragment::new(ChangeTag::Equal, "=="),
            ]
        );
    }

    #[test]
    fn cleaned_fragments_rebuild_both_texts() {
        let pairs = [
            ("the cat sat", "a dog sat down"),
            ("mouse", "sofas"),
            ("line one\nline two\n", "line 1\nline two\nline three\n"),
            ("ünïcödé", "unicode"),
        ];
        for (old, new) in pairs {
            let fragments = cleaned(old, new);
            assert_eq!(side(&fragments, ChangeTag::Insert), old);
            assert_eq!(side(&fragments, ChangeTag::Delete), new);
        }
    }
    #[test]
    fn large_rewrite_renders_and_rebuilds_both_texts() {
        let old: String = (0..3000).map(|i| format!("let a{i} = {i};\n")).collect();
        let new: String = (0..3000)
            .map(|i| format!("const b{} = \"{}\";\n", 7 * i, 13 * i))
            .collect();

        let fragments = cleaned(&old, &new);
        assert_eq!(side(&fragments, ChangeTag::Insert), old);
        assert_eq!(side(&fragments, ChangeTag::Delete), new);

        let html = render(&old, &new);
        assert!(html.contains("<ins"));
        assert_eq!(html, render(&old, &new));
    }

    #[test]
    fn oversized_line_pair_is_a_whole_replacement() {
        let old = "x".repeat(5000);
        let new = "y".repeat(5000);
        let fragments = cleaned(&old, &new);
        assert_eq!(
            fragments,
            vec![
                Fragment::new(ChangeTag::Delete, old.as_str()),
                Fragment::new(ChangeTag::Insert, new.as_str()),
            ]
        );
    }

    #[test]
    fn unchanged_lines_stay_equal_around_a_hunk() {
        let old = "keep\nold line\nkeep too\n";
        let new = "keep\nnew line\nkeep too\n";
        let fragments = cleaned(old, new);
        assert_eq!(fragments.first().unwrap().tag, ChangeTag::Equal);
        assert_eq!(fragments.last().unwrap().text, " line\nkeep too\n");
    }
}
