// fabric-provisioner-core/src/infrastructure/adapters/tds.rs

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::domain::identity::{AccessToken, SQL_COPT_SS_ACCESS_TOKEN};
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::{ConnectRequest, SqlConnection, SqlDriver};

/// SQL driver speaking TDS to Fabric SQL endpoints.
///
/// Accepts the ODBC-style connection string and the framed access-token
/// attribute, and turns them into a tiberius login with an Entra token.
pub struct TdsDriver {
    port: u16,
}

impl TdsDriver {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct TdsConnection {
    client: Client<Compat<TcpStream>>,
}

#[async_trait]
impl SqlDriver for TdsDriver {
    async fn connect(
        &self,
        request: &ConnectRequest,
    ) -> Result<Box<dyn SqlConnection>, InfrastructureError> {
        let token = request
            .attributes
            .get(&SQL_COPT_SS_ACCESS_TOKEN)
            .and_then(|raw| AccessToken::from_connection_attribute(raw))
            .ok_or_else(|| {
                DatabaseError::InvalidConnection(
                    "missing or malformed access token attribute".into(),
                )
            })?;

        let mut config = Config::from_ado_string(&to_ado_string(
            &request.connection_string,
            self.port,
        ))?;
        config.authentication(AuthMethod::AADToken(token.secret().to_string()));

        debug!(addr = %config.get_addr(), "Opening TDS connection");
        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        Ok(Box::new(TdsConnection { client }))
    }
}

#[async_trait]
impl SqlConnection for TdsConnection {
    async fn execute(&mut self, statement: &str) -> Result<(), InfrastructureError> {
        self.client.execute(statement, &[]).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), InfrastructureError> {
        self.client
            .simple_query("IF @@TRANCOUNT > 0 COMMIT TRANSACTION")
            .await?
            .into_results()
            .await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), InfrastructureError> {
        self.client.close().await?;
        Ok(())
    }
}

/// Rewrites the ODBC connection string for the TDS client: the `Driver`
/// segment is dropped, the server gets an explicit port, and encryption is
/// required.
fn to_ado_string(odbc: &str, port: u16) -> String {
    let mut parts: Vec<String> = odbc
        .split(';')
        .filter_map(|segment| segment.split_once('='))
        .filter(|(key, _)| !key.trim().eq_ignore_ascii_case("driver"))
        .map(|(key, value)| {
            let (key, value) = (key.trim(), value.trim());
            if key.eq_ignore_ascii_case("server") && !value.contains(',') {
                format!("{}=tcp:{},{}", key, value, port)
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect();
    parts.push("Encrypt=true".into());
    parts.join(";")
}
