use std::num::NonZeroU32;
use std::ops::RangeInclusive;

/// A run of consecutive pages that becomes one output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGroup {
    /// 1-based position of the group in generation order
    pub sequence: u32,
    /// First 1-based page number (inclusive)
    pub first: u32,
    /// Last 1-based page number (inclusive)
    pub last: u32,
}

impl PageGroup {
    pub fn page_count(&self) -> u32 {
        self.last - self.first + 1
    }

    /// 1-based page numbers covered by this group, in document order
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// Number of groups needed to cover `total_pages`, i.e. ceil(N / K)
pub fn group_count(total_pages: u32, group_size: NonZeroU32) -> u32 {
    total_pages.div_ceil(group_size.get())
}

/// Partition pages `1..=total_pages` into consecutive groups of at most
/// `group_size` pages. Only the last group may be short.
pub fn page_groups(total_pages: u32, group_size: NonZeroU32) -> impl Iterator<Item = PageGroup> {
    let size = group_size.get();
    (0..group_count(total_pages, group_size)).map(move |index| PageGroup {
        sequence: index + 1,
        first: index * size + 1,
        last: index
            .saturating_add(1)
            .saturating_mul(size)
            .min(total_pages),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn lengths(total: u32, k: u32) -> Vec<u32> {
        page_groups(total, size(k)).map(|g| g.page_count()).collect()
    }

    #[test]
    fn test_seven_pages_in_threes() {
        let groups: Vec<_> = page_groups(7, size(3)).collect();
        assert_eq!(lengths(7, 3), vec![3, 3, 1]);
        assert_eq!(
            groups.iter().map(|g| g.sequence).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(groups[2].pages(), 7..=7);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(page_groups(0, size(3)).count(), 0);
        assert_eq!(group_count(0, size(3)), 0);
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(lengths(9, 3), vec![3, 3, 3]);
    }

    #[test]
    fn test_group_larger_than_document() {
        assert_eq!(lengths(2, 5), vec![2]);
    }

    #[test]
    fn test_huge_group_size_does_not_overflow() {
        let groups: Vec<_> = page_groups(4, size(u32::MAX)).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pages(), 1..=4);
    }

    #[test]
    fn test_groups_partition_pages_in_order() {
        for total in 0..=40 {
            for k in 1..=8 {
                let pages: Vec<u32> = page_groups(total, size(k))
                    .flat_map(|g| g.pages())
                    .collect();
                assert_eq!(pages, (1..=total).collect::<Vec<_>>(), "N={total} K={k}");

                let lens = lengths(total, k);
                assert_eq!(lens.len() as u32, group_count(total, size(k)));
                if let Some(&last) = lens.last() {
                    let expected = if total % k == 0 { k } else { total % k };
                    assert_eq!(last, expected, "N={total} K={k}");
                }
                assert!(lens.iter().all(|&l| l >= 1 && l <= k));
            }
        }
    }
}
