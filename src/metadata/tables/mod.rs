//! Metadata tables of the `#~` stream.
//!
//! Only the tables needed to identify a module, its references and its declared types are
//! decoded into rows. Every other table is still sized so the decoded ones can be located.

mod codedindex;
mod rows;
mod tableid;
mod tableinfo;

use std::marker::PhantomData;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use rows::{AssemblyRaw, AssemblyRefRaw, ModuleRaw, NestedClassRaw, TypeDefRaw, TypeRefRaw};
pub use tableid::{TableId, TABLE_COUNT};
pub use tableinfo::{TableInfo, TableRowInfo};

use crate::{Error::OutOfBounds, Result};

/// A row type that can be decoded from a metadata table.
pub trait RowDefinition: Sized {
    /// The table this row type belongs to.
    const TABLE: TableId;

    /// Decodes the row starting at `offset`, advancing `offset` past it.
    ///
    /// # Errors
    /// Returns an error if the row is truncated or holds an invalid coded index.
    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self>;
}

/// A typed view over the rows of one metadata table.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sizes: &'a TableInfo,
    _phantom: PhantomData<T>,
}

impl<'a, T: RowDefinition> MetadataTable<'a, T> {
    pub(crate) fn new(data: &'a [u8], row_count: u32, sizes: &'a TableInfo) -> Self {
        MetadataTable {
            data,
            row_count,
            row_size: sizes.row_size(T::TABLE),
            sizes,
            _phantom: PhantomData,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Decodes the row with the 1-based id `rid`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `rid` is 0 or past the last row.
    pub fn get(&self, rid: u32) -> Result<T> {
        if rid == 0 || rid > self.row_count {
            return Err(OutOfBounds);
        }

        let mut offset = (rid as usize - 1) * self.row_size as usize;
        T::read_row(self.data, &mut offset, rid, self.sizes)
    }

    /// Iterates all rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (1..=self.row_count).map(move |rid| self.get(rid))
    }
}
