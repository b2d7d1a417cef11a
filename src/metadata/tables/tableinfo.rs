use crate::metadata::tables::{CodedIndexType, TableId, TABLE_COUNT};

/// Row count of one table and the width of indexes into it.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// Number of rows
    pub rows: u32,
    /// Number of bits required to address every row
    pub bits: u8,
    /// Whether indexes into this table are 4 bytes wide
    pub is_large: bool,
}

impl TableRowInfo {
    /// Computes the index width for a table with `rows` rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Row counts of all tables and the index widths derived from them.
///
/// Every column that references a heap, a table or a coded index is 2 bytes wide unless
/// the referenced entity is too large to be addressed with 16 bits.
#[derive(Clone, Debug)]
pub struct TableInfo {
    rows: [TableRowInfo; TABLE_COUNT],
    heap_sizes: u8,
}

impl TableInfo {
    /// Builds the table info from row counts and the `heap_sizes` byte of the tables stream.
    #[must_use]
    pub fn new(row_counts: &[(TableId, u32)], heap_sizes: u8) -> Self {
        let mut rows = [TableRowInfo::default(); TABLE_COUNT];
        for (table, count) in row_counts {
            rows[table.slot()] = TableRowInfo::new(*count);
        }

        TableInfo { rows, heap_sizes }
    }

    /// Row information of `table`.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table.slot()]
    }

    /// Number of rows of `table`.
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table.slot()].rows
    }

    /// Whether indexes into `table` are 4 bytes wide.
    #[must_use]
    pub fn is_large(&self, table: TableId) -> bool {
        self.rows[table.slot()].is_large
    }

    /// Whether `#Strings` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.heap_sizes & 0x01 != 0
    }

    /// Whether `#GUID` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.heap_sizes & 0x02 != 0
    }

    /// Whether `#Blob` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.heap_sizes & 0x04 != 0
    }

    /// Width of a `#Strings` index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_str() {
            4
        } else {
            2
        }
    }

    /// Width of a `#GUID` index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_guid() {
            4
        } else {
            2
        }
    }

    /// Width of a `#Blob` index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_blob() {
            4
        } else {
            2
        }
    }

    /// Width of a simple index into `table`.
    #[must_use]
    pub fn table_index_bytes(&self, table: TableId) -> u8 {
        if self.rows[table.slot()].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Width of a coded index of kind `ci_type`.
    #[must_use]
    pub fn coded_index_bytes(&self, ci_type: CodedIndexType) -> u8 {
        let max_bits = ci_type
            .tables()
            .iter()
            .map(|table| self.rows[table.slot()].bits)
            .max()
            .unwrap_or(1);

        if u32::from(max_bits) + ci_type.tag_bits() > 16 {
            4
        } else {
            2
        }
    }

    /// Size in bytes of one row of `table` (ECMA-335 II.22).
    #[must_use]
    #[rustfmt::skip]
    pub fn row_size(&self, table: TableId) -> u32 {
        let s = u32::from(self.str_bytes());
        let g = u32::from(self.guid_bytes());
        let b = u32::from(self.blob_bytes());
        let idx = |table: TableId| u32::from(self.table_index_bytes(table));
        let coded = |ci_type: CodedIndexType| u32::from(self.coded_index_bytes(ci_type));

        match table {
            TableId::Module => 2 + s + 3 * g,
            TableId::TypeRef => coded(CodedIndexType::ResolutionScope) + 2 * s,
            TableId::TypeDef => {
                4 + 2 * s
                    + coded(CodedIndexType::TypeDefOrRef)
                    + idx(TableId::Field)
                    + idx(TableId::MethodDef)
            }
            TableId::FieldPtr => idx(TableId::Field),
            TableId::Field => 2 + s + b,
            TableId::MethodPtr => idx(TableId::MethodDef),
            TableId::MethodDef => 4 + 2 + 2 + s + b + idx(TableId::Param),
            TableId::ParamPtr => idx(TableId::Param),
            TableId::Param => 2 + 2 + s,
            TableId::InterfaceImpl => idx(TableId::TypeDef) + coded(CodedIndexType::TypeDefOrRef),
            TableId::MemberRef => coded(CodedIndexType::MemberRefParent) + s + b,
            TableId::Constant => 2 + coded(CodedIndexType::HasConstant) + b,
            TableId::CustomAttribute => {
                coded(CodedIndexType::HasCustomAttribute)
                    + coded(CodedIndexType::CustomAttributeType)
                    + b
            }
            TableId::FieldMarshal => coded(CodedIndexType::HasFieldMarshal) + b,
            TableId::DeclSecurity => 2 + coded(CodedIndexType::HasDeclSecurity) + b,
            TableId::ClassLayout => 2 + 4 + idx(TableId::TypeDef),
            TableId::FieldLayout => 4 + idx(TableId::Field),
            TableId::StandAloneSig => b,
            TableId::EventMap => idx(TableId::TypeDef) + idx(TableId::Event),
            TableId::EventPtr => idx(TableId::Event),
            TableId::Event => 2 + s + coded(CodedIndexType::TypeDefOrRef),
            TableId::PropertyMap => idx(TableId::TypeDef) + idx(TableId::Property),
            TableId::PropertyPtr => idx(TableId::Property),
            TableId::Property => 2 + s + b,
            TableId::MethodSemantics => 2 + idx(TableId::MethodDef) + coded(CodedIndexType::HasSemantics),
            TableId::MethodImpl => idx(TableId::TypeDef) + 2 * coded(CodedIndexType::MethodDefOrRef),
            TableId::ModuleRef => s,
            TableId::TypeSpec => b,
            TableId::ImplMap => {
                2 + coded(CodedIndexType::MemberForwarded) + s + idx(TableId::ModuleRef)
            }
            TableId::FieldRVA => 4 + idx(TableId::Field),
            TableId::EncLog => 4 + 4,
            TableId::EncMap => 4,
            TableId::Assembly => 4 + 2 * 4 + 4 + b + 2 * s,
            TableId::AssemblyProcessor => 4,
            TableId::AssemblyOS => 4 * 3,
            TableId::AssemblyRef => 2 * 4 + 4 + 2 * b + 2 * s,
            TableId::AssemblyRefProcessor => 4 + idx(TableId::AssemblyRef),
            TableId::AssemblyRefOS => 4 * 3 + idx(TableId::AssemblyRef),
            TableId::File => 4 + s + b,
            TableId::ExportedType => 4 + 4 + 2 * s + coded(CodedIndexType::Implementation),
            TableId::ManifestResource => 4 + 4 + s + coded(CodedIndexType::Implementation),
            TableId::NestedClass => 2 * idx(TableId::TypeDef),
            TableId::GenericParam => 2 + 2 + coded(CodedIndexType::TypeOrMethodDef) + s,
            TableId::MethodSpec => coded(CodedIndexType::MethodDefOrRef) + b,
            TableId::GenericParamConstraint => {
                idx(TableId::GenericParam) + coded(CodedIndexType::TypeDefOrRef)
            }
        }
    }
}
