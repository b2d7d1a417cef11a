use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{CodedIndex, CodedIndexType, RowDefinition, TableId, TableInfo},
    Result,
};

/// A row of the `Module` table. The table holds exactly one row.
#[derive(Debug, Clone)]
pub struct ModuleRaw {
    /// Row id
    pub rid: u32,
    /// Reserved, zero
    pub generation: u16,
    /// `#Strings` index of the module file name
    pub name: u32,
    /// `#GUID` index of the module version id
    pub mvid: u32,
}

impl RowDefinition for ModuleRaw {
    const TABLE: TableId = TableId::Module;

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        let generation = read_le_at::<u16>(data, offset)?;
        let name = read_le_at_dyn(data, offset, sizes.is_large_str())?;
        let mvid = read_le_at_dyn(data, offset, sizes.is_large_guid())?;
        // EncId and EncBaseId
        read_le_at_dyn(data, offset, sizes.is_large_guid())?;
        read_le_at_dyn(data, offset, sizes.is_large_guid())?;

        Ok(ModuleRaw {
            rid,
            generation,
            name,
            mvid,
        })
    }
}

/// A row of the `TypeRef` table.
#[derive(Debug, Clone)]
pub struct TypeRefRaw {
    /// Row id
    pub rid: u32,
    /// Where the type is defined: another module, an assembly, or an enclosing `TypeRef`
    pub resolution_scope: CodedIndex,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the namespace
    pub type_namespace: u32,
}

impl RowDefinition for TypeRefRaw {
    const TABLE: TableId = TableId::TypeRef;

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            resolution_scope: CodedIndex::read(
                data,
                offset,
                sizes,
                CodedIndexType::ResolutionScope,
            )?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

/// A row of the `TypeDef` table.
#[derive(Debug, Clone)]
pub struct TypeDefRaw {
    /// Row id
    pub rid: u32,
    /// `TypeAttributes`
    pub flags: u32,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the namespace
    pub type_namespace: u32,
    /// Base type; a null index for interfaces and `System.Object`
    pub extends: CodedIndex,
    /// First row of the field list
    pub field_list: u32,
    /// First row of the method list
    pub method_list: u32,
}

impl RowDefinition for TypeDefRaw {
    const TABLE: TableId = TableId::TypeDef;

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

/// A row of the `NestedClass` table.
#[derive(Debug, Clone)]
pub struct NestedClassRaw {
    /// Row id
    pub rid: u32,
    /// `TypeDef` row of the nested type
    pub nested_class: u32,
    /// `TypeDef` row of the enclosing type
    pub enclosing_class: u32,
}

impl RowDefinition for NestedClassRaw {
    const TABLE: TableId = TableId::NestedClass;

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(NestedClassRaw {
            rid,
            nested_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}

/// The row of the `Assembly` table, the manifest of a module that is an assembly.
#[derive(Debug, Clone)]
pub struct AssemblyRaw {
    /// Row id
    pub rid: u32,
    /// Hash algorithm of the file hashes
    pub hash_alg_id: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// `AssemblyFlags`
    pub flags: u32,
    /// `#Blob` index of the public key
    pub public_key: u32,
    /// `#Strings` index of the simple assembly name
    pub name: u32,
    /// `#Strings` index of the culture
    pub culture: u32,
}

impl RowDefinition for AssemblyRaw {
    const TABLE: TableId = TableId::Assembly;

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(AssemblyRaw {
            rid,
            hash_alg_id: read_le_at::<u32>(data, offset)?,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

/// A row of the `AssemblyRef` table.
#[derive(Debug, Clone)]
pub struct AssemblyRefRaw {
    /// Row id
    pub rid: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// `AssemblyFlags`
    pub flags: u32,
    /// `#Blob` index of the public key or token
    pub public_key_or_token: u32,
    /// `#Strings` index of the simple assembly name
    pub name: u32,
    /// `#Strings` index of the culture
    pub culture: u32,
    /// `#Blob` index of the hash value
    pub hash_value: u32,
}

impl RowDefinition for AssemblyRefRaw {
    const TABLE: TableId = TableId::AssemblyRef;

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(AssemblyRefRaw {
            rid,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key_or_token: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::MetadataTable;

    #[test]
    fn typedef_rows() {
        let sizes = TableInfo::new(&[(TableId::TypeDef, 2), (TableId::TypeRef, 1)], 0);

        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x10, 0x00, // flags
            0x05, 0x00,             // name
            0x0A, 0x00,             // namespace
            0x05, 0x00,             // extends = TypeRef 1
            0x01, 0x00,             // field list
            0x01, 0x00,             // method list

            0x00, 0x00, 0x00, 0x00,
            0x11, 0x00,
            0x0A, 0x00,
            0x04, 0x00,             // extends = TypeDef 1
            0x01, 0x00,
            0x01, 0x00,
        ];

        let table = MetadataTable::<TypeDefRaw>::new(&data, 2, &sizes);
        assert_eq!(table.row_size(), 14);

        let first = table.get(1).unwrap();
        assert_eq!(first.flags, 0x0010_0001);
        assert_eq!(first.type_name, 5);
        assert_eq!(first.extends.tag, TableId::TypeRef);
        assert_eq!(first.extends.row, 1);

        let second = table.get(2).unwrap();
        assert_eq!(second.extends.tag, TableId::TypeDef);
        assert_eq!(second.extends.row, 1);

        assert!(table.get(0).is_err());
        assert!(table.get(3).is_err());
        assert_eq!(table.iter().filter(Result::is_ok).count(), 2);
    }

    #[test]
    fn assemblyref_row() {
        let sizes = TableInfo::new(&[(TableId::AssemblyRef, 1)], 0);

        #[rustfmt::skip]
        let data = [
            0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // version 4.0.0.0
            0x00, 0x00, 0x00, 0x00, // flags
            0x00, 0x00,             // public key or token
            0x20, 0x00,             // name
            0x00, 0x00,             // culture
            0x00, 0x00,             // hash value
        ];

        let table = MetadataTable::<AssemblyRefRaw>::new(&data, 1, &sizes);
        let row = table.get(1).unwrap();

        assert_eq!(row.major_version, 4);
        assert_eq!(row.name, 0x20);
        assert_eq!(row.rid, 1);
    }
}
