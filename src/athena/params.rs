//! Query parameters and the rules that pick exactly one mode

use super::error::InfoError;
use tracing::debug;

/// User-facing parameters of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoParams {
    /// Catalog name (`catalog_name` is accepted as an alias by the CLI)
    pub name: Option<String>,
    pub database_name: Option<String>,
    pub list_databases: bool,
    pub list_database_tables: bool,
    pub list_work_groups: bool,
}

/// Parameter names as they appear in validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    DatabaseName,
    ListDatabases,
    ListDatabaseTables,
    ListWorkGroups,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::DatabaseName => "database_name",
            Field::ListDatabases => "list_databases",
            Field::ListDatabaseTables => "list_database_tables",
            Field::ListWorkGroups => "list_work_groups",
        }
    }
}

/// A single validation constraint over [`InfoParams`]
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// At most one of these may be present
    MutuallyExclusive(&'static [Field]),
    /// When `flag` is set, every field in `requires` must be present
    RequiredIf {
        flag: Field,
        requires: &'static [Field],
    },
}

/// Evaluated in order; the first violation is reported
pub const RULES: &[Rule] = &[
    Rule::MutuallyExclusive(&[
        Field::ListDatabases,
        Field::ListDatabaseTables,
        Field::ListWorkGroups,
    ]),
    Rule::MutuallyExclusive(&[Field::Name, Field::ListWorkGroups]),
    Rule::MutuallyExclusive(&[Field::DatabaseName, Field::ListWorkGroups]),
    Rule::RequiredIf {
        flag: Field::ListDatabases,
        requires: &[Field::Name],
    },
    Rule::RequiredIf {
        flag: Field::ListDatabaseTables,
        requires: &[Field::Name, Field::DatabaseName],
    },
];

impl Rule {
    pub fn check(&self, params: &InfoParams) -> Result<(), InfoError> {
        match *self {
            Rule::MutuallyExclusive(fields) => {
                let present = fields.iter().filter(|f| params.is_present(**f)).count();
                if present > 1 {
                    return Err(InfoError::MutuallyExclusive {
                        fields: fields.iter().map(Field::as_str).collect(),
                    });
                }
            }
            Rule::RequiredIf { flag, requires } => {
                if params.is_present(flag) {
                    let missing: Vec<&'static str> = requires
                        .iter()
                        .filter(|f| !params.is_present(**f))
                        .map(Field::as_str)
                        .collect();
                    if !missing.is_empty() {
                        return Err(InfoError::MissingRequired {
                            flag: flag.as_str(),
                            missing,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// The one listing an invocation performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Catalogs,
    Databases { catalog: String },
    Tables { catalog: String, database: String },
    WorkGroups,
}

impl InfoParams {
    /// Flags count when true, names when set and non-empty
    pub fn is_present(&self, field: Field) -> bool {
        match field {
            Field::Name => self.text(&self.name).is_some(),
            Field::DatabaseName => self.text(&self.database_name).is_some(),
            Field::ListDatabases => self.list_databases,
            Field::ListDatabaseTables => self.list_database_tables,
            Field::ListWorkGroups => self.list_work_groups,
        }
    }

    fn text<'a>(&self, value: &'a Option<String>) -> Option<&'a str> {
        value.as_deref().filter(|s| !s.is_empty())
    }

    /// Value of a required text field, reported against the flag that needs it
    fn required(&self, flag: Field, field: Field) -> Result<String, InfoError> {
        let value = match field {
            Field::Name => self.text(&self.name),
            Field::DatabaseName => self.text(&self.database_name),
            _ => None,
        };
        value.map(str::to_string).ok_or(InfoError::MissingRequired {
            flag: flag.as_str(),
            missing: vec![field.as_str()],
        })
    }

    /// Check every rule and resolve the single active mode
    pub fn validate(&self) -> Result<Mode, InfoError> {
        for rule in RULES {
            rule.check(self)?;
        }

        let mode = if self.list_databases {
            Mode::Databases {
                catalog: self.required(Field::ListDatabases, Field::Name)?,
            }
        } else if self.list_database_tables {
            Mode::Tables {
                catalog: self.required(Field::ListDatabaseTables, Field::Name)?,
                database: self.required(Field::ListDatabaseTables, Field::DatabaseName)?,
            }
        } else if self.list_work_groups {
            Mode::WorkGroups
        } else {
            if self.is_present(Field::Name) || self.is_present(Field::DatabaseName) {
                debug!("No list flag set; name/database_name ignored when listing catalogs");
            }
            Mode::Catalogs
        };

        debug!("Resolved mode: {:?}", mode);
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(databases: bool, tables: bool, work_groups: bool) -> InfoParams {
        InfoParams {
            name: Some("AwsDataCatalog".to_string()),
            database_name: Some("sampledb".to_string()),
            list_databases: databases,
            list_database_tables: tables,
            list_work_groups: work_groups,
        }
    }

    #[test]
    fn test_empty_params_list_catalogs() {
        assert_eq!(InfoParams::default().validate().unwrap(), Mode::Catalogs);
    }

    #[test]
    fn test_more_than_one_mode_flag_fails() {
        for (d, t, w) in [
            (true, true, false),
            (true, false, true),
            (false, true, true),
            (true, true, true),
        ] {
            let err = flags(d, t, w).validate().unwrap_err();
            assert_eq!(
                err.to_string(),
                "parameters are mutually exclusive: list_databases|list_database_tables|list_work_groups",
                "flags ({d}, {t}, {w})"
            );
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_list_databases_requires_name() {
        let params = InfoParams {
            list_databases: true,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "list_databases is True but all of the following are missing: name"
        );
    }

    #[test]
    fn test_empty_name_counts_as_missing() {
        let params = InfoParams {
            name: Some(String::new()),
            list_databases: true,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(InfoError::MissingRequired { flag: "list_databases", .. })
        ));
    }

    #[test]
    fn test_list_database_tables_requires_database_name() {
        let params = InfoParams {
            name: Some("AwsDataCatalog".to_string()),
            list_database_tables: true,
            ..Default::default()
        };
        match params.validate().unwrap_err() {
            InfoError::MissingRequired { flag, missing } => {
                assert_eq!(flag, "list_database_tables");
                assert_eq!(missing, vec!["database_name"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_database_tables_reports_all_missing() {
        let params = InfoParams {
            list_database_tables: true,
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "list_database_tables is True but all of the following are missing: name, database_name"
        );
    }

    #[test]
    fn test_work_groups_exclude_names() {
        let with_name = InfoParams {
            name: Some("AwsDataCatalog".to_string()),
            list_work_groups: true,
            ..Default::default()
        };
        assert_eq!(
            with_name.validate().unwrap_err().to_string(),
            "parameters are mutually exclusive: name|list_work_groups"
        );

        let with_database = InfoParams {
            database_name: Some("sampledb".to_string()),
            list_work_groups: true,
            ..Default::default()
        };
        assert_eq!(
            with_database.validate().unwrap_err().to_string(),
            "parameters are mutually exclusive: database_name|list_work_groups"
        );
    }

    #[test]
    fn test_valid_modes() {
        let databases = InfoParams {
            name: Some("AwsDataCatalog".to_string()),
            list_databases: true,
            ..Default::default()
        };
        assert_eq!(
            databases.validate().unwrap(),
            Mode::Databases {
                catalog: "AwsDataCatalog".to_string()
            }
        );

        assert_eq!(
            flags(false, true, false).validate().unwrap(),
            Mode::Tables {
                catalog: "AwsDataCatalog".to_string(),
                database: "sampledb".to_string()
            }
        );

        let work_groups = InfoParams {
            list_work_groups: true,
            ..Default::default()
        };
        assert_eq!(work_groups.validate().unwrap(), Mode::WorkGroups);
    }

    #[test]
    fn test_names_without_flags_still_list_catalogs() {
        assert_eq!(flags(false, false, false).validate().unwrap(), Mode::Catalogs);
    }
}
