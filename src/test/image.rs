use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

const FILE_ALIGNMENT: usize = 0x200;
const SECTION_ALIGNMENT: usize = 0x2000;
const TEXT_RVA: usize = 0x2000;
const CLI_HEADER_RVA: usize = TEXT_RVA + 8;
const METADATA_RVA: usize = CLI_HEADER_RVA + 72;

const COR_ILONLY: u32 = 0x0000_0001;
const CLASS_FLAGS: u32 = 0x0010_0001;

struct TypeDefEntry {
    flags: u32,
    namespace: String,
    name: String,
    extends: u16,
}

struct TypeRefEntry {
    scope: u16,
    namespace: String,
    name: String,
}

/// Synthesizes minimal managed PE32 images.
///
/// The image has a single `.text` section holding the CLI header and the metadata. The
/// metadata carries the `#~`, `#Strings` and `#Blob` streams with the `Module`, `TypeRef`,
/// `TypeDef`, `Assembly`, `AssemblyRef` and `NestedClass` tables, all with 2 byte indexes.
/// `TypeDef` row 1 is always `<Module>`.
pub struct ModuleImageBuilder {
    name: String,
    version: [u16; 4],
    references: Vec<String>,
    type_refs: Vec<TypeRefEntry>,
    type_defs: Vec<TypeDefEntry>,
    type_def_names: Vec<String>,
    nested: Vec<(u16, u16)>,
    il_only: bool,
    assembly: bool,
    clr_header: bool,
}

impl ModuleImageBuilder {
    pub fn new(name: &str) -> Self {
        ModuleImageBuilder {
            name: name.to_string(),
            version: [1, 0, 0, 0],
            references: Vec::new(),
            type_refs: Vec::new(),
            type_defs: vec![TypeDefEntry {
                flags: 0,
                namespace: String::new(),
                name: "<Module>".to_string(),
                extends: 0,
            }],
            type_def_names: vec!["<Module>".to_string()],
            nested: Vec::new(),
            il_only: true,
            assembly: true,
            clr_header: true,
        }
    }

    pub fn version(mut self, major: u16, minor: u16, build: u16, revision: u16) -> Self {
        self.version = [major, minor, build, revision];
        self
    }

    /// Adds an `AssemblyRef` row. Duplicates are written as separate rows.
    pub fn reference(mut self, name: &str) -> Self {
        self.references.push(name.to_string());
        self
    }

    /// Adds a `TypeRef` scoped to the assembly reference `assembly`, adding that if missing.
    pub fn type_ref(mut self, assembly: &str, namespace: &str, name: &str) -> Self {
        let scope = match self.references.iter().position(|known| known == assembly) {
            Some(position) => position + 1,
            None => {
                self.references.push(assembly.to_string());
                self.references.len()
            }
        };

        self.type_refs.push(TypeRefEntry {
            scope: ((scope as u16) << 2) | 2,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Adds a `TypeDef`. `base` is the full name of an earlier definition or reference.
    pub fn type_def(mut self, namespace: &str, name: &str, base: Option<&str>) -> Self {
        let extends = self.extends(base);
        self.type_defs.push(TypeDefEntry {
            flags: CLASS_FLAGS,
            namespace: namespace.to_string(),
            name: name.to_string(),
            extends,
        });
        self.type_def_names.push(full_name(namespace, name));
        self
    }

    /// Adds a `TypeDef` nested in the earlier definition called `enclosing`.
    pub fn nested_type_def(mut self, enclosing: &str, name: &str, base: Option<&str>) -> Self {
        let enclosing_rid = self.type_def_rid(enclosing);
        let extends = self.extends(base);
        self.type_defs.push(TypeDefEntry {
            flags: CLASS_FLAGS,
            namespace: String::new(),
            name: name.to_string(),
            extends,
        });
        self.type_def_names.push(format!("{enclosing}/{name}"));
        self.nested
            .push((self.type_defs.len() as u16, enclosing_rid));
        self
    }

    /// Clears the `ILONLY` flag of the CLI header.
    pub fn mixed_mode(mut self) -> Self {
        self.il_only = false;
        self
    }

    /// Omits the `Assembly` table.
    pub fn without_assembly(mut self) -> Self {
        self.assembly = false;
        self
    }

    /// Leaves the CLR runtime header data directory empty, as in a native image.
    pub fn without_clr_header(mut self) -> Self {
        self.clr_header = false;
        self
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.build()).unwrap();
        path
    }

    pub fn build(&self) -> Vec<u8> {
        let metadata = self.metadata();

        let mut text = vec![0_u8; 8];
        text.extend_from_slice(&self.cli_header(metadata.len() as u32));
        text.extend_from_slice(&metadata);
        let raw_size = align(text.len(), FILE_ALIGNMENT);
        text.resize(raw_size, 0);

        let mut image = self.headers(raw_size);
        image.extend_from_slice(&text);
        image
    }

    fn type_def_rid(&self, full_name: &str) -> u16 {
        match self.type_def_names.iter().position(|known| known == full_name) {
            Some(position) => (position + 1) as u16,
            None => panic!("unknown type definition {full_name}"),
        }
    }

    fn extends(&self, base: Option<&str>) -> u16 {
        let Some(base) = base else {
            return 0;
        };

        if let Some(position) = self.type_def_names.iter().position(|known| known == base) {
            return ((position + 1) as u16) << 2;
        }

        match self
            .type_refs
            .iter()
            .position(|entry| full_name(&entry.namespace, &entry.name) == base)
        {
            Some(position) => (((position + 1) as u16) << 2) | 1,
            None => panic!("unknown base type {base}"),
        }
    }

    fn headers(&self, raw_size: usize) -> Vec<u8> {
        let mut image = vec![0_u8; FILE_ALIGNMENT];

        // DOS header
        image[0..2].copy_from_slice(b"MZ");
        put_u32(&mut image, 0x3C, 0x80);

        // PE signature and COFF header
        image[0x80..0x84].copy_from_slice(b"PE\0\0");
        put_u16(&mut image, 0x84, 0x014C);
        put_u16(&mut image, 0x86, 1);
        put_u16(&mut image, 0x94, 224);
        put_u16(&mut image, 0x96, 0x2102);

        // PE32 optional header
        let optional = 0x98;
        put_u16(&mut image, optional, 0x010B);
        image[optional + 2] = 8;
        put_u32(&mut image, optional + 4, raw_size as u32);
        put_u32(&mut image, optional + 20, TEXT_RVA as u32);
        put_u32(&mut image, optional + 28, 0x0040_0000);
        put_u32(&mut image, optional + 32, SECTION_ALIGNMENT as u32);
        put_u32(&mut image, optional + 36, FILE_ALIGNMENT as u32);
        put_u16(&mut image, optional + 40, 4);
        put_u16(&mut image, optional + 48, 4);
        put_u32(
            &mut image,
            optional + 56,
            (TEXT_RVA + align(raw_size, SECTION_ALIGNMENT)) as u32,
        );
        put_u32(&mut image, optional + 60, FILE_ALIGNMENT as u32);
        put_u16(&mut image, optional + 68, 3);
        put_u16(&mut image, optional + 70, 0x8540);
        put_u32(&mut image, optional + 72, 0x0010_0000);
        put_u32(&mut image, optional + 76, 0x1000);
        put_u32(&mut image, optional + 80, 0x0010_0000);
        put_u32(&mut image, optional + 84, 0x1000);
        put_u32(&mut image, optional + 92, 16);

        // CLR runtime header, data directory 14
        if self.clr_header {
            let directory = optional + 96 + 14 * 8;
            put_u32(&mut image, directory, CLI_HEADER_RVA as u32);
            put_u32(&mut image, directory + 4, 72);
        }

        // .text section header
        let section = optional + 224;
        image[section..section + 5].copy_from_slice(b".text");
        put_u32(&mut image, section + 8, raw_size as u32);
        put_u32(&mut image, section + 12, TEXT_RVA as u32);
        put_u32(&mut image, section + 16, raw_size as u32);
        put_u32(&mut image, section + 20, FILE_ALIGNMENT as u32);
        put_u32(&mut image, section + 36, 0x6000_0020);

        image
    }

    fn cli_header(&self, metadata_size: u32) -> Vec<u8> {
        let mut header = vec![0_u8; 72];
        put_u32(&mut header, 0, 72);
        put_u16(&mut header, 4, 2);
        put_u16(&mut header, 6, 5);
        put_u32(&mut header, 8, METADATA_RVA as u32);
        put_u32(&mut header, 12, metadata_size);
        put_u32(&mut header, 16, if self.il_only { COR_ILONLY } else { 0 });
        header
    }

    fn metadata(&self) -> Vec<u8> {
        let mut strings = StringHeap::default();
        let tables = self.tables(&mut strings);
        let strings = strings.into_bytes();
        let blob = vec![0_u8; 4];

        let streams: [(&str, usize); 3] = [
            ("#~", tables.len()),
            ("#Strings", strings.len()),
            ("#Blob", blob.len()),
        ];

        let mut root = Vec::new();
        root.extend_from_slice(&0x424A_5342_u32.to_le_bytes());
        root.extend_from_slice(&1_u16.to_le_bytes());
        root.extend_from_slice(&1_u16.to_le_bytes());
        root.extend_from_slice(&0_u32.to_le_bytes());
        root.extend_from_slice(&12_u32.to_le_bytes());
        root.extend_from_slice(b"v4.0.30319\0\0");
        root.extend_from_slice(&0_u16.to_le_bytes());
        root.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        let header_len: usize = streams
            .iter()
            .map(|(name, _)| 8 + align(name.len() + 1, 4))
            .sum();
        let mut offset = root.len() + header_len;
        for (name, size) in streams {
            root.extend_from_slice(&(offset as u32).to_le_bytes());
            root.extend_from_slice(&(size as u32).to_le_bytes());
            let mut padded = name.as_bytes().to_vec();
            padded.resize(align(name.len() + 1, 4), 0);
            root.extend_from_slice(&padded);
            offset += size;
        }

        root.extend_from_slice(&tables);
        root.extend_from_slice(&strings);
        root.extend_from_slice(&blob);
        root
    }

    fn tables(&self, strings: &mut StringHeap) -> Vec<u8> {
        let mut present: Vec<(u8, u32, Vec<u8>)> = Vec::new();

        let mut module = Vec::new();
        push_u16(&mut module, 0);
        push_u16(&mut module, strings.add(&format!("{}.dll", self.name)));
        push_u16(&mut module, 0);
        push_u16(&mut module, 0);
        push_u16(&mut module, 0);
        present.push((0x00, 1, module));

        if !self.type_refs.is_empty() {
            let mut rows = Vec::new();
            for entry in &self.type_refs {
                push_u16(&mut rows, entry.scope);
                push_u16(&mut rows, strings.add(&entry.name));
                push_u16(&mut rows, strings.add(&entry.namespace));
            }
            present.push((0x01, self.type_refs.len() as u32, rows));
        }

        let mut rows = Vec::new();
        for entry in &self.type_defs {
            rows.extend_from_slice(&entry.flags.to_le_bytes());
            push_u16(&mut rows, strings.add(&entry.name));
            push_u16(&mut rows, strings.add(&entry.namespace));
            push_u16(&mut rows, entry.extends);
            push_u16(&mut rows, 1);
            push_u16(&mut rows, 1);
        }
        present.push((0x02, self.type_defs.len() as u32, rows));

        if self.assembly {
            let mut rows = Vec::new();
            rows.extend_from_slice(&0x8004_u32.to_le_bytes());
            for part in self.version {
                push_u16(&mut rows, part);
            }
            rows.extend_from_slice(&0_u32.to_le_bytes());
            push_u16(&mut rows, 0);
            push_u16(&mut rows, strings.add(&self.name));
            push_u16(&mut rows, 0);
            present.push((0x20, 1, rows));
        }

        if !self.references.is_empty() {
            let mut rows = Vec::new();
            for reference in &self.references {
                for part in [4_u16, 0, 0, 0] {
                    push_u16(&mut rows, part);
                }
                rows.extend_from_slice(&0_u32.to_le_bytes());
                push_u16(&mut rows, 0);
                push_u16(&mut rows, strings.add(reference));
                push_u16(&mut rows, 0);
                push_u16(&mut rows, 0);
            }
            present.push((0x23, self.references.len() as u32, rows));
        }

        if !self.nested.is_empty() {
            let mut rows = Vec::new();
            for (nested, enclosing) in &self.nested {
                push_u16(&mut rows, *nested);
                push_u16(&mut rows, *enclosing);
            }
            present.push((0x29, self.nested.len() as u32, rows));
        }

        let valid = present
            .iter()
            .fold(0_u64, |mask, (id, _, _)| mask | (1 << id));

        let mut stream = vec![0, 0, 0, 0, 2, 0, 0, 1];
        stream.extend_from_slice(&valid.to_le_bytes());
        stream.extend_from_slice(&0_u64.to_le_bytes());
        for (_, count, _) in &present {
            stream.extend_from_slice(&count.to_le_bytes());
        }
        for (_, _, rows) in &present {
            stream.extend_from_slice(rows);
        }
        stream.resize(align(stream.len(), 4), 0);
        stream
    }
}

#[derive(Default)]
struct StringHeap {
    data: Vec<u8>,
    offsets: HashMap<String, u16>,
}

impl StringHeap {
    fn add(&mut self, value: &str) -> u16 {
        if self.data.is_empty() {
            self.data.push(0);
        }
        if value.is_empty() {
            return 0;
        }
        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }

        let offset = self.data.len() as u16;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset);
        offset
    }

    fn into_bytes(mut self) -> Vec<u8> {
        if self.data.is_empty() {
            self.data.push(0);
        }
        self.data.resize(align(self.data.len(), 4), 0);
        self.data
    }
}

fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

fn put_u16(buffer: &mut [u8], offset: usize, value: u16) {
    buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn push_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_le_bytes());
}
