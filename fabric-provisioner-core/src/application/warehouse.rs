// fabric-provisioner-core/src/application/warehouse.rs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::domain::access_role::DEFAULT_ROLE_NAME;
use crate::domain::acl::ResolvedGrantee;
use crate::domain::endpoint::{EndpointHandle, EndpointTarget};
use crate::domain::error::DomainError;
use crate::domain::identity::{AccessToken, SQL_COPT_SS_ACCESS_TOKEN, TokenScope};
use crate::domain::schema::quote_identifier;
use crate::error::ProvisionerError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::workspace::{LakehouseItem, LoadTableRequest, WorkspaceRef};
use crate::ports::{
    ConnectRequest, SqlConnection, SqlDriver, TableSession, TokenProvider, WarehouseGateway,
    WorkspaceApi,
};

pub const DEFAULT_SQL_DRIVER: &str = "ODBC Driver 18 for SQL Server";

/// Settings of the warehouse client that are not per-operation.
#[derive(Debug, Clone)]
pub struct WarehouseSettings {
    pub sql_driver: String,
    pub access_role_name: String,
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            sql_driver: DEFAULT_SQL_DRIVER.to_string(),
            access_role_name: DEFAULT_ROLE_NAME.to_string(),
        }
    }
}

/// Fabric warehouse/lakehouse client. Holds no per-operation state: endpoint
/// data travels in [`EndpointHandle`]s and connections live in sessions.
pub struct WarehouseClient {
    workspaces: Arc<dyn WorkspaceApi>,
    sql: Arc<dyn SqlDriver>,
    tokens: Arc<dyn TokenProvider>,
    settings: WarehouseSettings,
}

impl WarehouseClient {
    pub fn new(
        workspaces: Arc<dyn WorkspaceApi>,
        sql: Arc<dyn SqlDriver>,
        tokens: Arc<dyn TokenProvider>,
        settings: WarehouseSettings,
    ) -> Self {
        Self {
            workspaces,
            sql,
            tokens,
            settings,
        }
    }

    async fn find_workspace(
        &self,
        token: &AccessToken,
        name: &str,
    ) -> Result<WorkspaceRef, ProvisionerError> {
        // First match wins when several workspaces share a name.
        self.workspaces
            .list_workspaces(token)
            .await?
            .into_iter()
            .find(|w| w.name == name)
            .ok_or_else(|| DomainError::not_found("Workspace", name).into())
    }

    async fn find_lakehouse(
        &self,
        token: &AccessToken,
        workspace: &WorkspaceRef,
        name: &str,
    ) -> Result<LakehouseItem, ProvisionerError> {
        self.workspaces
            .list_lakehouses(token, &workspace.id)
            .await?
            .into_iter()
            .find(|l| l.display_name == name)
            .ok_or_else(|| DomainError::not_found_in("Lakehouse", name, &workspace.name).into())
    }
}

#[async_trait]
impl WarehouseGateway for WarehouseClient {
    #[instrument(skip(self))]
    async fn resolve_endpoint(
        &self,
        workspace: &str,
        target: &EndpointTarget,
    ) -> Result<EndpointHandle, ProvisionerError> {
        let token = self.tokens.token(TokenScope::Workspace).await?;
        let ws = self.find_workspace(&token, workspace).await?;

        let (item_id, sql_endpoint) = match target {
            EndpointTarget::Warehouse(name) => {
                let item = self
                    .workspaces
                    .list_warehouses(&token, &ws.id)
                    .await?
                    .into_iter()
                    .find(|w| &w.display_name == name)
                    .ok_or_else(|| DomainError::not_found_in("Warehouse", name, &ws.name))?;
                let detail = self
                    .workspaces
                    .get_warehouse(&token, &ws.id, &item.id)
                    .await?;
                let endpoint = detail.connection_string.ok_or_else(|| {
                    DomainError::not_found_in("SQL endpoint of warehouse", name, &ws.name)
                })?;
                (item.id, endpoint)
            }
            EndpointTarget::Lakehouse(name) => {
                let item = self.find_lakehouse(&token, &ws, name).await?;
                let endpoint = item.sql_endpoint.ok_or_else(|| {
                    DomainError::not_found_in("SQL endpoint of lakehouse", name, &ws.name)
                })?;
                (item.id, endpoint)
            }
        };

        info!("SQL Endpoint found: {}", sql_endpoint);
        Ok(EndpointHandle {
            workspace_id: ws.id,
            item_id,
            target: target.clone(),
            sql_endpoint,
        })
    }

    fn session(&self, handle: EndpointHandle) -> Box<dyn TableSession + '_> {
        Box::new(WarehouseSession {
            client: self,
            handle,
            connection: None,
        })
    }

    #[instrument(skip(self, grantees), fields(grantees.len = grantees.len()))]
    async fn apply_lakehouse_access_role(
        &self,
        workspace: &str,
        lakehouse: &str,
        grantees: &[ResolvedGrantee],
        read_all: bool,
    ) -> Result<(), ProvisionerError> {
        let token = self.tokens.token(TokenScope::Workspace).await?;
        let ws = self.find_workspace(&token, workspace).await?;
        let item = self.find_lakehouse(&token, &ws, lakehouse).await?;

        // Read-modify-write on the whole document: concurrent writers race and
        // the last PUT wins.
        let mut roles = self
            .workspaces
            .get_data_access_roles(&token, &ws.id, &item.id)
            .await?;
        roles.grant(&self.settings.access_role_name, &ws.id, grantees, read_all);
        self.workspaces
            .put_data_access_roles(&token, &ws.id, &item.id, &roles)
            .await?;

        info!(
            role = %self.settings.access_role_name,
            "Data access role updated on lakehouse '{}'", lakehouse
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_table(
        &self,
        workspace: &str,
        lakehouse: &str,
        table: &str,
        relative_path: &str,
        file_format: &str,
    ) -> Result<bool, ProvisionerError> {
        let token = self.tokens.token(TokenScope::Workspace).await?;
        let ws = self.find_workspace(&token, workspace).await?;
        let item = self.find_lakehouse(&token, &ws, lakehouse).await?;

        let request = LoadTableRequest::overwrite_from_file(relative_path, file_format);
        let accepted = self
            .workspaces
            .load_table(&token, &ws.id, &item.id, table, &request)
            .await?;

        if accepted {
            info!("Table '{}' loaded successfully from '{}'.", table, relative_path);
        } else {
            warn!("Failed to load table '{}' from '{}'.", table, relative_path);
        }
        Ok(accepted)
    }
}

/// One operation's view of an endpoint. Connects on first use.
pub struct WarehouseSession<'a> {
    client: &'a WarehouseClient,
    handle: EndpointHandle,
    connection: Option<Box<dyn SqlConnection>>,
}

impl WarehouseSession<'_> {
    async fn connection(&mut self) -> Result<&mut Box<dyn SqlConnection>, ProvisionerError> {
        if self.connection.is_none() {
            let token = self.client.tokens.token(TokenScope::Database).await?;
            let request = ConnectRequest {
                connection_string: self
                    .handle
                    .connection_string(&self.client.settings.sql_driver),
                attributes: BTreeMap::from([(
                    SQL_COPT_SS_ACCESS_TOKEN,
                    token.to_connection_attribute(),
                )]),
            };
            let conn = self.client.sql.connect(&request).await?;
            info!("Connection to {} successfully established.", self.handle.target);
            self.connection = Some(conn);
        }

        self.connection
            .as_mut()
            .ok_or_else(|| ProvisionerError::InternalError("SQL connection missing".into()))
    }

    /// Runs one DDL statement and commits it. Driver failures surface as
    /// `QueryExecution` errors.
    async fn execute_definition_query(&mut self, query: &str) -> Result<(), ProvisionerError> {
        let conn = self.connection().await?;

        let outcome = match conn.execute(query).await {
            Ok(()) => conn.commit().await,
            Err(e) => Err(e),
        };
        outcome.map_err(|e| InfrastructureError::QueryExecution(e.to_string()))?;

        info!("Operation completed successfully.");
        Ok(())
    }
}

#[async_trait]
impl TableSession for WarehouseSession<'_> {
    async fn create_table(&mut self, name: &str, columns: &str) -> Result<bool, ProvisionerError> {
        info!("Creating table '{}' with schema: {}", name, columns);
        self.execute_definition_query(&format!("CREATE TABLE {} ({})", name, columns))
            .await?;
        Ok(true)
    }

    async fn drop_table_if_exists(&mut self, name: &str) -> Result<bool, ProvisionerError> {
        info!("Drop table: '{}' if exist", name);
        self.execute_definition_query(&format!("DROP TABLE IF EXISTS {}", name))
            .await?;
        Ok(true)
    }

    async fn grant_table_privileges(
        &mut self,
        name: &str,
        grantees: &[ResolvedGrantee],
        all_privileges: bool,
    ) -> Result<bool, ProvisionerError> {
        let conn = self.connection().await?;

        for grantee in grantees {
            let statement = grant_statement(name, grantee, all_privileges);
            info!("Executing query: {}", statement);
            if let Err(e) = conn.execute(&statement).await {
                error!("Error applying ACL to table: {}", e);
                return Ok(false);
            }
        }

        if let Err(e) = conn.commit().await {
            error!("Error applying ACL to table: {}", e);
            return Ok(false);
        }

        info!("Successfully updated ACL for table '{}'.", name);
        Ok(true)
    }

    async fn close(mut self: Box<Self>) -> Result<(), ProvisionerError> {
        if let Some(conn) = self.connection.take() {
            conn.close().await?;
            info!("Connection to {} closed", self.handle.target);
        }
        Ok(())
    }
}

/// `GRANT ALL PRIVILEGES` for owners, `GRANT SELECT` for readers.
pub fn grant_statement(table: &str, grantee: &ResolvedGrantee, all_privileges: bool) -> String {
    let privileges = if all_privileges {
        "ALL PRIVILEGES"
    } else {
        "SELECT"
    };
    format!(
        "GRANT {} ON {} TO {};",
        privileges,
        table,
        quote_identifier(&grantee.name)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::application::resolver::tests::StaticTokens;
    use crate::domain::access_role::DataAccessRoles;
    use crate::ports::workspace::WarehouseItem;
    use std::sync::Mutex;

    // --- MOCK SQL DRIVER ---
    #[derive(Default)]
    pub(crate) struct SqlLog {
        pub connects: Vec<ConnectRequest>,
        pub statements: Vec<String>,
        pub commits: usize,
        pub closes: usize,
    }

    #[derive(Clone, Default)]
    pub(crate) struct MockSqlDriver {
        pub log: Arc<Mutex<SqlLog>>,
        /// Statements containing this text fail.
        pub fail_on: Option<String>,
        pub refuse_connection: bool,
    }

    struct MockConnection {
        log: Arc<Mutex<SqlLog>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl SqlDriver for MockSqlDriver {
        async fn connect(
            &self,
            request: &ConnectRequest,
        ) -> Result<Box<dyn SqlConnection>, InfrastructureError> {
            if self.refuse_connection {
                return Err(InfrastructureError::ConfigError("login failed".into()));
            }
            self.log.lock().unwrap().connects.push(request.clone());
            Ok(Box::new(MockConnection {
                log: self.log.clone(),
                fail_on: self.fail_on.clone(),
            }))
        }
    }

    #[async_trait]
    impl SqlConnection for MockConnection {
        async fn execute(&mut self, statement: &str) -> Result<(), InfrastructureError> {
            if let Some(pattern) = self.fail_on.as_deref().filter(|p| statement.contains(p)) {
                return Err(InfrastructureError::ConfigError(format!(
                    "Cannot find the user '{}'",
                    pattern
                )));
            }
            self.log.lock().unwrap().statements.push(statement.to_string());
            Ok(())
        }

        async fn commit(&mut self) -> Result<(), InfrastructureError> {
            self.log.lock().unwrap().commits += 1;
            Ok(())
        }

        async fn close(self: Box<Self>) -> Result<(), InfrastructureError> {
            self.log.lock().unwrap().closes += 1;
            Ok(())
        }
    }

    // --- MOCK WORKSPACE API ---
    #[derive(Default)]
    pub(crate) struct MockWorkspaces {
        pub roles: Mutex<DataAccessRoles>,
        pub puts: Mutex<Vec<DataAccessRoles>>,
        pub loads: Mutex<Vec<(String, LoadTableRequest)>>,
        pub accept_loads: bool,
    }

    #[async_trait]
    impl WorkspaceApi for MockWorkspaces {
        async fn list_workspaces(
            &self,
            _token: &AccessToken,
        ) -> Result<Vec<WorkspaceRef>, ProvisionerError> {
            Ok(vec![
                WorkspaceRef {
                    id: "ws-0".into(),
                    name: "other".into(),
                },
                WorkspaceRef {
                    id: "ws-1".into(),
                    name: "finance".into(),
                },
                WorkspaceRef {
                    id: "ws-2".into(),
                    name: "finance".into(),
                },
            ])
        }

        async fn list_warehouses(
            &self,
            _token: &AccessToken,
            workspace_id: &str,
        ) -> Result<Vec<WarehouseItem>, ProvisionerError> {
            Ok(vec![WarehouseItem {
                id: format!("{}-wh", workspace_id),
                display_name: "sales_dwh".into(),
                connection_string: None,
            }])
        }

        async fn get_warehouse(
            &self,
            _token: &AccessToken,
            _workspace_id: &str,
            warehouse_id: &str,
        ) -> Result<WarehouseItem, ProvisionerError> {
            Ok(WarehouseItem {
                id: warehouse_id.into(),
                display_name: "sales_dwh".into(),
                connection_string: Some("abc.datawarehouse.fabric.microsoft.com".into()),
            })
        }

        async fn list_lakehouses(
            &self,
            _token: &AccessToken,
            workspace_id: &str,
        ) -> Result<Vec<LakehouseItem>, ProvisionerError> {
            Ok(vec![
                LakehouseItem {
                    id: format!("{}-lh", workspace_id),
                    display_name: "raw_lake".into(),
                    sql_endpoint: Some("lake.datawarehouse.fabric.microsoft.com".into()),
                },
                LakehouseItem {
                    id: format!("{}-lh-new", workspace_id),
                    display_name: "fresh_lake".into(),
                    sql_endpoint: None,
                },
            ])
        }

        async fn get_data_access_roles(
            &self,
            _token: &AccessToken,
            _workspace_id: &str,
            _item_id: &str,
        ) -> Result<DataAccessRoles, ProvisionerError> {
            Ok(self.roles.lock().unwrap().clone())
        }

        async fn put_data_access_roles(
            &self,
            _token: &AccessToken,
            _workspace_id: &str,
            _item_id: &str,
            roles: &DataAccessRoles,
        ) -> Result<(), ProvisionerError> {
            self.puts.lock().unwrap().push(roles.clone());
            Ok(())
        }

        async fn load_table(
            &self,
            _token: &AccessToken,
            _workspace_id: &str,
            lakehouse_id: &str,
            table_name: &str,
            request: &LoadTableRequest,
        ) -> Result<bool, ProvisionerError> {
            self.loads
                .lock()
                .unwrap()
                .push((format!("{}/{}", lakehouse_id, table_name), request.clone()));
            Ok(self.accept_loads)
        }
    }

    fn client(workspaces: Arc<MockWorkspaces>, sql: MockSqlDriver) -> WarehouseClient {
        WarehouseClient::new(
            workspaces,
            Arc::new(sql),
            Arc::new(StaticTokens::default()),
            WarehouseSettings::default(),
        )
    }

    fn grantee(name: &str) -> ResolvedGrantee {
        ResolvedGrantee { name: name.into() }
    }

    #[tokio::test]
    async fn test_resolve_warehouse_endpoint_first_match_wins() -> anyhow::Result<()> {
        let client = client(Arc::new(MockWorkspaces::default()), MockSqlDriver::default());
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await?;

        assert_eq!(handle.workspace_id, "ws-1");
        assert_eq!(handle.item_id, "ws-1-wh");
        assert_eq!(handle.sql_endpoint, "abc.datawarehouse.fabric.microsoft.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_lakehouse_endpoint() -> anyhow::Result<()> {
        let client = client(Arc::new(MockWorkspaces::default()), MockSqlDriver::default());
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Lakehouse("raw_lake".into()))
            .await?;
        assert_eq!(handle.sql_endpoint, "lake.datawarehouse.fabric.microsoft.com");

        let pending = client
            .resolve_endpoint("finance", &EndpointTarget::Lakehouse("fresh_lake".into()))
            .await;
        assert!(matches!(
            pending,
            Err(ProvisionerError::Domain(DomainError::NotFound { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_endpoint_misses() {
        let client = client(Arc::new(MockWorkspaces::default()), MockSqlDriver::default());

        let no_ws = client
            .resolve_endpoint("marketing", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await;
        assert!(matches!(
            no_ws,
            Err(ProvisionerError::Domain(DomainError::NotFound { kind: "Workspace", .. }))
        ));

        let no_wh = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("hr_dwh".into()))
            .await;
        assert!(matches!(
            no_wh,
            Err(ProvisionerError::Domain(DomainError::NotFound { kind: "Warehouse", .. }))
        ));
    }

    #[tokio::test]
    async fn test_session_connects_lazily_with_token_attribute() -> anyhow::Result<()> {
        let sql = MockSqlDriver::default();
        let client = client(Arc::new(MockWorkspaces::default()), sql.clone());
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await?;

        let mut session = client.session(handle);
        assert!(sql.log.lock().unwrap().connects.is_empty());

        assert!(session.create_table("dbo.sales", "\t[id] [int] NULL").await?);
        assert!(session.drop_table_if_exists("dbo.old").await?);
        session.close().await?;

        let log = sql.log.lock().unwrap();
        assert_eq!(log.connects.len(), 1);
        let request = &log.connects[0];
        assert!(request.connection_string.contains("Database=sales_dwh;"));
        let attr = &request.attributes[&SQL_COPT_SS_ACCESS_TOKEN];
        assert_eq!(
            AccessToken::from_connection_attribute(attr),
            Some(AccessToken::new("token-for-Database"))
        );
        assert_eq!(
            log.statements,
            vec![
                "CREATE TABLE dbo.sales (\t[id] [int] NULL)".to_string(),
                "DROP TABLE IF EXISTS dbo.old".to_string(),
            ]
        );
        assert_eq!(log.commits, 2);
        assert_eq!(log.closes, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_ddl_failure_is_query_execution_error() -> anyhow::Result<()> {
        let sql = MockSqlDriver {
            fail_on: Some("CREATE".into()),
            ..Default::default()
        };
        let client = client(Arc::new(MockWorkspaces::default()), sql);
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await?;

        let mut session = client.session(handle);
        let result = session.create_table("dbo.sales", "\t[id] [int] NULL").await;
        assert!(matches!(
            result,
            Err(ProvisionerError::Infrastructure(
                InfrastructureError::QueryExecution(_)
            ))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_grants_per_grantee() -> anyhow::Result<()> {
        let sql = MockSqlDriver::default();
        let client = client(Arc::new(MockWorkspaces::default()), sql.clone());
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await?;
        let mut session = client.session(handle);

        let owners = [grantee("devs")];
        assert!(session.grant_table_privileges("dbo.sales", &owners, true).await?);
        let readers = [grantee("alice@corp.com"), grantee("bob@corp.com")];
        assert!(session.grant_table_privileges("dbo.sales", &readers, false).await?);

        let log = sql.log.lock().unwrap();
        assert_eq!(
            log.statements,
            vec![
                "GRANT ALL PRIVILEGES ON dbo.sales TO [devs];".to_string(),
                "GRANT SELECT ON dbo.sales TO [alice@corp.com];".to_string(),
                "GRANT SELECT ON dbo.sales TO [bob@corp.com];".to_string(),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_grant_failure_returns_false() -> anyhow::Result<()> {
        let sql = MockSqlDriver {
            fail_on: Some("bob".into()),
            ..Default::default()
        };
        let client = client(Arc::new(MockWorkspaces::default()), sql.clone());
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await?;
        let mut session = client.session(handle);

        let readers = [grantee("alice@corp.com"), grantee("bob@corp.com")];
        assert!(!session.grant_table_privileges("dbo.sales", &readers, false).await?);
        assert_eq!(sql.log.lock().unwrap().commits, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_failure_propagates() -> anyhow::Result<()> {
        let sql = MockSqlDriver {
            refuse_connection: true,
            ..Default::default()
        };
        let client = client(Arc::new(MockWorkspaces::default()), sql);
        let handle = client
            .resolve_endpoint("finance", &EndpointTarget::Warehouse("sales_dwh".into()))
            .await?;
        let mut session = client.session(handle);

        assert!(
            session
                .grant_table_privileges("dbo.sales", &[grantee("devs")], true)
                .await
                .is_err()
        );
        // Nothing was opened, closing is a no-op.
        session.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_lakehouse_access_role() -> anyhow::Result<()> {
        let workspaces = Arc::new(MockWorkspaces::default());
        let client = client(workspaces.clone(), MockSqlDriver::default());

        client
            .apply_lakehouse_access_role("finance", "raw_lake", &[grantee("devs")], true)
            .await?;

        let puts = workspaces.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        let admin = &puts[0].value[0];
        assert_eq!(admin.name, "Admin");
        assert_eq!(admin.members.fabric_item_members[0].source_path, "ws-1/devs");
        assert_eq!(admin.members.fabric_item_members[0].item_access, vec!["ReadAll"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_table_request() -> anyhow::Result<()> {
        let workspaces = Arc::new(MockWorkspaces {
            accept_loads: true,
            ..Default::default()
        });
        let client = client(workspaces.clone(), MockSqlDriver::default());

        let loaded = client
            .load_table("finance", "raw_lake", "payments", "Files/payments.csv", "CSV")
            .await?;
        assert!(loaded);

        let loads = workspaces.loads.lock().unwrap();
        assert_eq!(loads[0].0, "ws-1-lh/payments");
        assert_eq!(loads[0].1.mode, "Overwrite");
        assert_eq!(loads[0].1.format_options.format, "CSV");
        assert!(loads[0].1.format_options.header);
        Ok(())
    }
}
