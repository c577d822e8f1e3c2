use crate::prompt::Prompt;
use crate::resolver::Resolver;
use crate::secret_manager::SecretManagerRegistry;
use crate::writer::Writer;
use crate::{MoldError, Result};
use envmold_core::{TagFilter, Template, Variable};
use indexmap::IndexMap;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

/// The variable store: resolved variables keyed by name, in template order.
///
/// A default `Mold` is unpopulated; every operation except lookups by name
/// fails with [`MoldError::EmptyMold`] until it is built from a template.
/// A template that declares the same name twice keeps the later declaration,
/// at the position of the first.
#[derive(Debug, Clone, Default)]
pub struct Mold {
    variables: Option<IndexMap<String, Variable>>,
}

impl Mold {
    /// Builds a store from parsed template declarations.
    pub fn new(template: Template) -> Self {
        let mut variables = IndexMap::with_capacity(template.len());
        for variable in template.into_variables() {
            variables.insert(variable.name.clone(), variable);
        }
        Self {
            variables: Some(variables),
        }
    }

    /// Parses a template from `reader` and builds a store from it.
    pub fn from_reader<R: Read>(reader: R, tags: Option<&TagFilter>) -> Result<Self> {
        Ok(Self::new(Template::from_reader(reader, tags)?))
    }

    /// Loads the template at `path` and builds a store from it.
    ///
    /// # Errors
    ///
    /// Returns [`MoldError::NoTemplate`] when the file does not exist.
    pub fn from_path(path: &Path, tags: Option<&TagFilter>) -> Result<Self> {
        let template = Template::from_path(path, tags).map_err(|e| match e {
            envmold_core::ParseError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                MoldError::NoTemplate(path.to_path_buf())
            }
            other => other.into(),
        })?;
        debug!(path = %path.display(), variables = template.len(), "Loaded template");
        Ok(Self::new(template))
    }

    /// Resolves every variable in template order.
    ///
    /// # Errors
    ///
    /// Returns [`MoldError::EmptyMold`] for an unpopulated store, otherwise
    /// the first resolution error.
    pub fn generate(
        &mut self,
        registry: &SecretManagerRegistry,
        prompt: &mut dyn Prompt,
    ) -> Result<()> {
        let variables = self.variables.as_mut().ok_or(MoldError::EmptyMold)?;
        info!(count = variables.len(), "Resolving variables");
        Resolver::new(registry, prompt).resolve_all(variables.values_mut())
    }

    /// Looks up a variable by its exact name.
    pub fn get_variable(&self, name: &str) -> Result<&Variable> {
        self.variables
            .as_ref()
            .and_then(|variables| variables.get(name))
            .ok_or_else(|| MoldError::EnvironmentVariableDoesNotExist(name.to_string()))
    }

    /// All variables in template order.
    pub fn get_all_variables(&self) -> Result<Vec<&Variable>> {
        let variables = self.variables.as_ref().ok_or(MoldError::EmptyMold)?;
        Ok(variables.values().collect())
    }

    /// Hands all variables to `writer`.
    pub fn write_environment(&self, writer: &mut dyn Writer) -> Result<()> {
        let variables = self.get_all_variables()?;
        writer.write(&variables)
    }

    pub fn is_populated(&self) -> bool {
        self.variables.is_some()
    }
}
