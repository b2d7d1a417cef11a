use std::collections::HashMap;

use crate::{
    metadata::{
        streams::{Strings, TablesHeader},
        tables::{AssemblyRefRaw, CodedIndex, NestedClassRaw, TableId, TypeDefRaw, TypeRefRaw},
        typesystem::{TypeAttributes, TypeDefinition, TypeKey},
    },
    Result,
};

/// Builds [`TypeDefinition`]s and [`TypeKey`]s from the raw `TypeDef`, `TypeRef` and
/// `NestedClass` tables of one module.
///
/// `scope` is the name the module is known by to other modules; it becomes the scope of every
/// type the module declares and of every reference that resolves to the module itself.
pub struct TypeResolver<'a> {
    strings: &'a Strings<'a>,
    tables: &'a TablesHeader<'a>,
    scope: &'a str,
}

impl<'a> TypeResolver<'a> {
    /// Creates a resolver over the heaps and tables of one module.
    pub fn new(strings: &'a Strings<'a>, tables: &'a TablesHeader<'a>, scope: &'a str) -> Self {
        TypeResolver {
            strings,
            tables,
            scope,
        }
    }

    /// All declared types in `TypeDef` order, with their base types resolved to keys.
    ///
    /// # Errors
    /// Returns a malformed error for rows pointing at missing strings or rows, and for
    /// cyclic nesting.
    pub fn definitions(&self) -> Result<Vec<TypeDefinition>> {
        let Some(typedefs) = self.tables.table::<TypeDefRaw>() else {
            return Ok(Vec::new());
        };

        let rows = typedefs.iter().collect::<Result<Vec<_>>>()?;
        let enclosing = self.enclosing_classes()?;

        let keys = rows
            .iter()
            .map(|row| self.definition_key(&rows, &enclosing, row.rid))
            .collect::<Result<Vec<_>>>()?;

        rows.iter()
            .zip(&keys)
            .map(|(row, key)| {
                Ok(TypeDefinition {
                    key: key.clone(),
                    flags: TypeAttributes::from_bits_retain(row.flags),
                    base: self.base_key(&row.extends, &keys)?,
                })
            })
            .collect()
    }

    /// Resolves the `TypeRef` row `rid` to the key of the type it names.
    ///
    /// # Errors
    /// Returns an error if the row or its resolution scope cannot be read.
    pub fn reference_key(&self, rid: u32) -> Result<TypeKey> {
        let Some(typerefs) = self.tables.table::<TypeRefRaw>() else {
            return Err(malformed_error!("No TypeRef table for row {}", rid));
        };

        let mut names = Vec::new();
        let mut current = typerefs.get(rid)?;
        loop {
            names.push(self.strings.get(current.type_name as usize)?);

            let scope = current.resolution_scope;
            if scope.tag != TableId::TypeRef || scope.is_null() {
                names.reverse();
                return Ok(TypeKey::new(
                    self.scope_name(&scope)?,
                    self.strings.get(current.type_namespace as usize)?,
                    names.join("/"),
                ));
            }

            if names.len() > typerefs.row_count() as usize {
                return Err(malformed_error!("Cyclic TypeRef nesting at row {}", rid));
            }
            current = typerefs.get(scope.row)?;
        }
    }

    fn enclosing_classes(&self) -> Result<HashMap<u32, u32>> {
        let mut enclosing = HashMap::new();
        if let Some(nested) = self.tables.table::<NestedClassRaw>() {
            for row in nested.iter() {
                let row = row?;
                enclosing.insert(row.nested_class, row.enclosing_class);
            }
        }

        Ok(enclosing)
    }

    fn definition_key(
        &self,
        rows: &[TypeDefRaw],
        enclosing: &HashMap<u32, u32>,
        rid: u32,
    ) -> Result<TypeKey> {
        let mut names = Vec::new();
        let mut current = rid;
        loop {
            let Some(row) = rows.get((current as usize).wrapping_sub(1)) else {
                return Err(malformed_error!("Invalid TypeDef row - {}", current));
            };
            names.push(self.strings.get(row.type_name as usize)?);

            match enclosing.get(&current) {
                Some(_) if names.len() > rows.len() => {
                    return Err(malformed_error!("Cyclic TypeDef nesting at row {}", rid));
                }
                Some(outer) => current = *outer,
                None => {
                    names.reverse();
                    return Ok(TypeKey::new(
                        self.scope,
                        self.strings.get(row.type_namespace as usize)?,
                        names.join("/"),
                    ));
                }
            }
        }
    }

    fn base_key(&self, extends: &CodedIndex, definitions: &[TypeKey]) -> Result<Option<TypeKey>> {
        if extends.is_null() {
            return Ok(None);
        }

        match extends.tag {
            TableId::TypeDef => match definitions.get(extends.row as usize - 1) {
                Some(key) => Ok(Some(key.clone())),
                None => Err(malformed_error!("Invalid base TypeDef row - {}", extends.row)),
            },
            TableId::TypeRef => self.reference_key(extends.row).map(Some),
            // Generic instantiations; their definition is not tracked
            _ => Ok(None),
        }
    }

    fn scope_name(&self, scope: &CodedIndex) -> Result<String> {
        if scope.tag != TableId::AssemblyRef || scope.is_null() {
            return Ok(self.scope.to_string());
        }

        let Some(references) = self.tables.table::<AssemblyRefRaw>() else {
            return Err(malformed_error!("No AssemblyRef table for row {}", scope.row));
        };

        let reference = references.get(scope.row)?;
        Ok(self.strings.get(reference.name as usize)?.to_string())
    }
}
