//! The header of the tables stream (`#~`, or `#-` for unoptimized metadata).
//!
//! The header lists which tables are present and how many rows each has. The table data
//! follows directly, with every present table stored back to back in id order. Locating a
//! table therefore requires the row size of every table in front of it.

use crate::{
    file::parser::Parser,
    metadata::tables::{MetadataTable, RowDefinition, TableId, TableInfo, TABLE_COUNT},
    Error::OutOfBounds,
    Result,
};

/// Heap size flag announcing four extra bytes after the row counts
const EXTRA_DATA: u8 = 0x40;

#[derive(Clone, Copy, Debug)]
struct TableLocation {
    offset: usize,
    rows: u32,
}

/// The parsed tables stream header with the location of every present table.
pub struct TablesHeader<'a> {
    /// Major version of the table schema
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Bit mask of present tables
    pub valid: u64,
    /// Bit mask of sorted tables
    pub sorted: u64,
    info: TableInfo,
    locations: [Option<TableLocation>; TABLE_COUNT],
    data: &'a [u8],
}

impl<'a> TablesHeader<'a> {
    /// Parses the tables stream header and locates each table.
    ///
    /// # Errors
    /// Returns an error if the stream is truncated, announces an unknown table, or the
    /// tables do not fit inside the stream.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);
        let _reserved = parser.read_le::<u32>()?;
        let major_version = parser.read_le::<u8>()?;
        let minor_version = parser.read_le::<u8>()?;
        let heap_sizes = parser.read_le::<u8>()?;
        let _reserved = parser.read_le::<u8>()?;
        let valid = parser.read_le::<u64>()?;
        let sorted = parser.read_le::<u64>()?;

        if valid == 0 {
            return Err(malformed_error!("Tables stream declares no tables"));
        }

        let mut row_counts = Vec::with_capacity(valid.count_ones() as usize);
        for bit in 0..64_u8 {
            if valid & (1_u64 << bit) == 0 {
                continue;
            }

            let rows = parser.read_le::<u32>()?;
            match TableId::from_id(bit) {
                Some(table) => row_counts.push((table, rows)),
                None => {
                    return Err(malformed_error!(
                        "Tables stream contains unknown table 0x{:02X}",
                        bit
                    ))
                }
            }
        }

        if heap_sizes & EXTRA_DATA != 0 {
            parser.advance_by(4)?;
        }

        let info = TableInfo::new(&row_counts, heap_sizes);
        let mut locations = [None; TABLE_COUNT];
        let mut offset = parser.pos();
        for (table, rows) in row_counts {
            let Some(table_len) = (rows as usize).checked_mul(info.row_size(table) as usize)
            else {
                return Err(OutOfBounds);
            };

            let Some(table_end) = offset.checked_add(table_len) else {
                return Err(OutOfBounds);
            };

            if table_end > data.len() {
                return Err(OutOfBounds);
            }

            locations[table.slot()] = Some(TableLocation { offset, rows });
            offset = table_end;
        }

        Ok(TablesHeader {
            major_version,
            minor_version,
            valid,
            sorted,
            info,
            locations,
            data,
        })
    }

    /// Index widths and row counts of all tables.
    #[must_use]
    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    /// Returns `true` if `table` is present.
    #[must_use]
    pub fn has_table(&self, table: TableId) -> bool {
        self.locations[table.slot()].is_some()
    }

    /// Number of rows of `table`, 0 if absent.
    #[must_use]
    pub fn table_row_count(&self, table: TableId) -> u32 {
        self.locations[table.slot()].map_or(0, |location| location.rows)
    }

    /// A typed view of the table holding rows of type `T`, if present.
    #[must_use]
    pub fn table<T: RowDefinition>(&self) -> Option<MetadataTable<'_, T>> {
        let location = self.locations[T::TABLE.slot()]?;
        let table_len = location.rows as usize * self.info.row_size(T::TABLE) as usize;
        let data = self
            .data
            .get(location.offset..location.offset + table_len)?;

        Some(MetadataTable::new(data, location.rows, &self.info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{AssemblyRefRaw, ModuleRaw};

    fn stream(valid: u64, heap_sizes: u8, row_counts: &[u32], extra: bool, body: &[u8]) -> Vec<u8> {
        let mut data = vec![0, 0, 0, 0, 2, 0, heap_sizes, 1];
        data.extend_from_slice(&valid.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes());
        for rows in row_counts {
            data.extend_from_slice(&rows.to_le_bytes());
        }
        if extra {
            data.extend_from_slice(&[0xEE; 4]);
        }
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn locates_tables() {
        // Module (10 bytes) then AssemblyRef (20 bytes)
        let mut body = vec![0; 10];
        body[2] = 0x07;
        let mut assembly_ref = vec![0; 20];
        assembly_ref[14] = 0x0C;
        body.extend_from_slice(&assembly_ref);

        let data = stream((1 << 0x00) | (1 << 0x23), 0, &[1, 1], false, &body);
        let header = TablesHeader::from(&data).unwrap();

        assert_eq!(header.major_version, 2);
        assert!(header.has_table(TableId::Module));
        assert!(!header.has_table(TableId::TypeDef));
        assert_eq!(header.table_row_count(TableId::AssemblyRef), 1);

        let module = header.table::<ModuleRaw>().unwrap().get(1).unwrap();
        assert_eq!(module.name, 7);

        let reference = header.table::<AssemblyRefRaw>().unwrap().get(1).unwrap();
        assert_eq!(reference.name, 0x0C);
    }

    #[test]
    fn extra_data_is_skipped() {
        let mut body = vec![0; 10];
        body[2] = 0x03;

        let data = stream(1, EXTRA_DATA, &[1], true, &body);
        let header = TablesHeader::from(&data).unwrap();

        let module = header.table::<ModuleRaw>().unwrap().get(1).unwrap();
        assert_eq!(module.name, 3);
    }

    #[test]
    fn unknown_table() {
        let data = stream(1 << 0x30, 0, &[1], false, &[0; 16]);
        assert!(TablesHeader::from(&data).is_err());
    }

    #[test]
    fn truncated_table() {
        let data = stream(1, 0, &[2], false, &[0; 10]);
        assert!(matches!(TablesHeader::from(&data), Err(OutOfBounds)));
    }
}
