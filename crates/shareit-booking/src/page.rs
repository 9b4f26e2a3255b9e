use shareit_core::{BookingError, BookingResult};

/// Offset/limit window applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    from: usize,
    size: Option<usize>,
}

impl Page {
    pub const DEFAULT_SIZE: i64 = 10;

    pub fn new(from: i64, size: i64) -> BookingResult<Self> {
        if from < 0 {
            return Err(BookingError::validation("from must not be negative"));
        }
        if size < 1 {
            return Err(BookingError::validation("size must be positive"));
        }

        Ok(Self {
            from: from as usize,
            size: Some(size as usize),
        })
    }

    pub fn all() -> Self {
        Self {
            from: 0,
            size: None,
        }
    }

    pub fn apply<T>(self, rows: Vec<T>) -> Vec<T> {
        let rows = rows.into_iter().skip(self.from);
        match self.size {
            Some(size) => rows.take(size).collect(),
            None => rows.collect(),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_skips_then_takes() {
        let page = Page::new(2, 2).unwrap();
        assert_eq!(page.apply(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        assert_eq!(Page::all().apply(vec![1, 2]), vec![1, 2]);
        assert!(Page::new(9, 3).unwrap().apply(vec![1]).is_empty());
    }

    #[test]
    fn page_rejects_negative_offset_and_empty_size() {
        assert!(matches!(Page::new(-1, 10), Err(BookingError::Validation(_))));
        assert!(matches!(Page::new(0, 0), Err(BookingError::Validation(_))));
    }
}
