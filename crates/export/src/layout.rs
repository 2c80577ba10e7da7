/// Half-open range of line indices, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of lines for the paginator.
pub trait LayoutInput {
    fn line_count(&self) -> usize;
    fn line_text(&self, index: usize) -> Option<&str>;
}

impl<S: AsRef<str>> LayoutInput for &[S] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_text(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// 1-based.
    pub page_number: usize,
    pub lines: LineRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSummary {
    pub total_pages: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone)]
pub struct PaginationResult {
    pub pages: Vec<PageLayout>,
    pub summary: LayoutSummary,
}

pub trait Paginator {
    fn paginate(&self, input: &dyn LayoutInput) -> PaginationResult;
}

/// Splits input into pages of at most `lines_per_page` lines.
#[derive(Debug, Clone, Copy)]
pub struct FixedLinePaginator {
    lines_per_page: usize,
}

impl FixedLinePaginator {
    pub fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page: lines_per_page.max(1),
        }
    }

    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }
}

impl Paginator for FixedLinePaginator {
    fn paginate(&self, input: &dyn LayoutInput) -> PaginationResult {
        let total_lines = input.line_count();
        let mut pages = Vec::with_capacity(total_lines.div_ceil(self.lines_per_page).max(1));

        let mut start = 0usize;
        while start < total_lines {
            let end = (start + self.lines_per_page).min(total_lines);
            pages.push(PageLayout {
                page_number: pages.len() + 1,
                lines: LineRange::new(start, end),
            });
            start = end;
        }

        // An empty input still lays out one blank page.
        if pages.is_empty() {
            pages.push(PageLayout {
                page_number: 1,
                lines: LineRange::new(0, 0),
            });
        }

        let summary = LayoutSummary {
            total_pages: pages.len(),
            total_lines,
        };
        PaginationResult { pages, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginates_into_multiple_pages() {
        let lines: Vec<String> = (0..12).map(|idx| format!("Line {idx}")).collect();
        let result = FixedLinePaginator::new(5).paginate(&lines.as_slice());

        assert_eq!(result.summary.total_lines, 12);
        assert_eq!(result.summary.total_pages, 3);
        let ranges: Vec<LineRange> = result.pages.iter().map(|page| page.lines).collect();
        assert_eq!(
            ranges,
            vec![
                LineRange::new(0, 5),
                LineRange::new(5, 10),
                LineRange::new(10, 12)
            ]
        );
        assert_eq!(result.pages[2].page_number, 3);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let lines: &[&str] = &["a", "b", "c", "d"];
        let result = FixedLinePaginator::new(2).paginate(&lines);
        assert_eq!(result.summary.total_pages, 2);
    }

    #[test]
    fn empty_input_produces_single_blank_page() {
        let lines: &[String] = &[];
        let result = FixedLinePaginator::new(40).paginate(&lines);
        assert_eq!(result.summary.total_pages, 1);
        assert!(result.pages[0].lines.is_empty());
    }

    #[test]
    fn zero_lines_per_page_is_clamped() {
        let paginator = FixedLinePaginator::new(0);
        assert_eq!(paginator.lines_per_page(), 1);
        let lines: &[&str] = &["x", "y"];
        let result = paginator.paginate(&lines);
        assert_eq!(result.summary.total_pages, 2);
    }
}
