use crate::error::{Error, Result};
use heapless::{String, Vec};

/// Sorted lookup from pin name to pin index.
#[derive(Default, Debug)]
pub(crate) struct NameIndex<const N: usize, const L: usize> {
    entries: Vec<(String<L>, u8), N>,
}

impl<const N: usize, const L: usize> NameIndex<N, L> {
    /// Replaces the index contents with the given `(name, index)` pairs.
    ///
    /// Empty names are skipped. On a duplicate name the first pin keeps the name and the
    /// index of the later pin is reported in the error.
    pub(crate) fn rebuild<'a>(
        &mut self,
        names: impl Iterator<Item = (&'a String<L>, u8)>,
    ) -> Result<()> {
        self.entries.clear();
        let mut result = Ok(());

        for (name, index) in names.filter(|(name, _)| !name.is_empty()) {
            match self.search(name) {
                Ok(_) => {
                    if result.is_ok() {
                        result = Err(Error::DuplicateName(index));
                    }
                }
                Err(pos) => {
                    self.entries
                        .insert(pos, (name.clone(), index))
                        .map_err(|_| Error::TooManyPins)?;
                }
            }
        }

        result
    }

    pub(crate) fn get_index(&self, name: &str) -> Option<u8> {
        self.search(name).ok().map(|pos| self.entries[pos].1)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn search(&self, name: &str) -> core::result::Result<usize, usize> {
        self.entries
            .binary_search_by(|(entry, _)| entry.as_str().cmp(name))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(list: &[(&str, u8)]) -> Vec<(String<16>, u8), 8> {
        list.iter()
            .map(|(name, index)| (String::try_from(*name).unwrap(), *index))
            .collect()
    }

    fn rebuild(ni: &mut NameIndex<8, 16>, list: &[(&str, u8)]) -> Result<()> {
        let list = names(list);
        ni.rebuild(list.iter().map(|(name, index)| (name, *index)))
    }

    #[test]
    fn basic_use() {
        let mut ni = NameIndex::<8, 16>::default();
        assert_eq!(ni.len(), 0);

        rebuild(&mut ni, &[("pump", 0), ("door", 1), ("estop", 2)]).unwrap();
        assert_eq!(ni.len(), 3);

        assert_eq!(ni.get_index("door"), Some(1));
        assert_eq!(ni.get_index("estop"), Some(2));
        assert_eq!(ni.get_index("pump"), Some(0));
    }

    #[test]
    fn get_index_not_found() {
        let ni = NameIndex::<8, 16>::default();
        assert!(ni.get_index("door").is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut ni = NameIndex::<8, 16>::default();
        rebuild(&mut ni, &[("Door", 4)]).unwrap();

        assert_eq!(ni.get_index("Door"), Some(4));
        assert!(ni.get_index("door").is_none());
        assert!(ni.get_index("Doo").is_none());
    }

    #[test]
    fn empty_names_skipped() {
        let mut ni = NameIndex::<8, 16>::default();
        rebuild(&mut ni, &[("", 0), ("door", 1), ("", 2)]).unwrap();

        assert_eq!(ni.len(), 1);
        assert!(ni.get_index("").is_none());
    }

    #[test]
    fn duplicates() {
        let mut ni = NameIndex::<8, 16>::default();

        assert_eq!(
            rebuild(&mut ni, &[("door", 0), ("pump", 1), ("door", 2)]),
            Err(Error::DuplicateName(2))
        );
        assert_eq!(ni.get_index("door"), Some(0));
        assert_eq!(ni.get_index("pump"), Some(1));
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut ni = NameIndex::<8, 16>::default();
        rebuild(&mut ni, &[("door", 0)]).unwrap();
        rebuild(&mut ni, &[("lid", 0)]).unwrap();

        assert!(ni.get_index("door").is_none());
        assert_eq!(ni.get_index("lid"), Some(0));
    }
}
