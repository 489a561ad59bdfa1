//! Postgres store backend. Composite substation operations run in a single
//! transaction; unique (23505) and foreign-key (23503) violations are mapped
//! to their `StoreError` variants so the services can translate them.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::models::{Network, NetworkDraft, Substation, SubstationDraft, SubstationRecord};
use super::{NetworkPlan, Store, StoreError};

const SELECT_SUBSTATION: &str = "SELECT id_subestacao AS id, codigo AS code, nome AS name, \
     latitude, longitude FROM tb_subestacao";

const SELECT_NETWORK: &str = "SELECT id_rede_mt AS id, id_subestacao AS substation_id, \
     codigo AS code, nome AS name, tensao_nominal AS nominal_voltage FROM tb_rede_mt";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tb_subestacao (
                id_subestacao SERIAL PRIMARY KEY,
                codigo VARCHAR(3) NOT NULL UNIQUE,
                nome VARCHAR(100) NOT NULL,
                latitude NUMERIC(16,13) NOT NULL,
                longitude NUMERIC(16,13) NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tb_rede_mt (
                id_rede_mt SERIAL PRIMARY KEY,
                id_subestacao INTEGER NOT NULL REFERENCES tb_subestacao (id_subestacao),
                codigo VARCHAR(5) NOT NULL UNIQUE,
                nome VARCHAR(100),
                tensao_nominal NUMERIC(5,2)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn networks_of(&self, substation_id: i32) -> Result<Vec<Network>, StoreError> {
        let networks = sqlx::query_as::<_, Network>(&format!(
            "{} WHERE id_subestacao = $1 ORDER BY id_rede_mt",
            SELECT_NETWORK
        ))
        .bind(substation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(networks)
    }

    async fn assemble(&self, record: SubstationRecord) -> Result<Substation, StoreError> {
        let networks = self.networks_of(record.id).await?;
        Ok(Substation::from_record(record, networks))
    }

    async fn apply_plan(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        substation_id: i32,
        plan: &[NetworkPlan],
    ) -> Result<(), StoreError> {
        for step in plan {
            match step {
                NetworkPlan::Adopt { id } => {
                    let result =
                        sqlx::query("UPDATE tb_rede_mt SET id_subestacao = $1 WHERE id_rede_mt = $2")
                            .bind(substation_id)
                            .bind(id)
                            .execute(&mut **tx)
                            .await
                            .map_err(map_db_err)?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::NotFound(format!(
                            "network {} no longer exists",
                            id
                        )));
                    }
                }
                NetworkPlan::Create {
                    code,
                    name,
                    nominal_voltage,
                } => {
                    sqlx::query(
                        "INSERT INTO tb_rede_mt (id_subestacao, codigo, nome, tensao_nominal) \
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(substation_id)
                    .bind(code)
                    .bind(name)
                    .bind(nominal_voltage)
                    .execute(&mut **tx)
                    .await
                    .map_err(map_db_err)?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_substations(&self) -> Result<Vec<Substation>, StoreError> {
        let records = sqlx::query_as::<_, SubstationRecord>(&format!(
            "{} ORDER BY id_subestacao",
            SELECT_SUBSTATION
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut substations = Vec::with_capacity(records.len());
        for record in records {
            substations.push(self.assemble(record).await?);
        }
        Ok(substations)
    }

    async fn substation_by_id(&self, id: i32) -> Result<Option<Substation>, StoreError> {
        let record = sqlx::query_as::<_, SubstationRecord>(&format!(
            "{} WHERE id_subestacao = $1",
            SELECT_SUBSTATION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(Some(self.assemble(record).await?)),
            None => Ok(None),
        }
    }

    async fn substation_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tb_subestacao WHERE codigo = $1")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }

    async fn create_substation(
        &self,
        draft: &SubstationDraft,
        plan: &[NetworkPlan],
    ) -> Result<Substation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, SubstationRecord>(
            "INSERT INTO tb_subestacao (codigo, nome, latitude, longitude) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id_subestacao AS id, codigo AS code, nome AS name, latitude, longitude",
        )
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        self.apply_plan(&mut tx, record.id, plan).await?;
        tx.commit().await?;

        self.assemble(record).await
    }

    async fn update_substation(
        &self,
        id: i32,
        draft: &SubstationDraft,
        plan: &[NetworkPlan],
    ) -> Result<Substation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, SubstationRecord>(
            "UPDATE tb_subestacao SET codigo = $1, nome = $2, latitude = $3, longitude = $4 \
             WHERE id_subestacao = $5 \
             RETURNING id_subestacao AS id, codigo AS code, nome AS name, latitude, longitude",
        )
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| StoreError::NotFound(format!("substation {} not found", id)))?;

        self.apply_plan(&mut tx, id, plan).await?;
        tx.commit().await?;

        self.assemble(record).await
    }

    async fn delete_substation(&self, id: i32) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tb_subestacao WHERE id_subestacao = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn list_networks(&self) -> Result<Vec<Network>, StoreError> {
        let networks =
            sqlx::query_as::<_, Network>(&format!("{} ORDER BY id_rede_mt", SELECT_NETWORK))
                .fetch_all(&self.pool)
                .await?;
        Ok(networks)
    }

    async fn network_by_id(&self, id: i32) -> Result<Option<Network>, StoreError> {
        let network =
            sqlx::query_as::<_, Network>(&format!("{} WHERE id_rede_mt = $1", SELECT_NETWORK))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(network)
    }

    async fn network_by_code(&self, code: &str) -> Result<Option<Network>, StoreError> {
        let network =
            sqlx::query_as::<_, Network>(&format!("{} WHERE codigo = $1", SELECT_NETWORK))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(network)
    }

    async fn network_by_code_in_substation(
        &self,
        code: &str,
        substation_id: i32,
    ) -> Result<Option<Network>, StoreError> {
        let network = sqlx::query_as::<_, Network>(&format!(
            "{} WHERE codigo = $1 AND id_subestacao = $2",
            SELECT_NETWORK
        ))
        .bind(code)
        .bind(substation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(network)
    }

    async fn insert_network(&self, draft: &NetworkDraft) -> Result<Network, StoreError> {
        let network = sqlx::query_as::<_, Network>(
            "INSERT INTO tb_rede_mt (id_subestacao, codigo, nome, tensao_nominal) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id_rede_mt AS id, id_subestacao AS substation_id, codigo AS code, \
             nome AS name, tensao_nominal AS nominal_voltage",
        )
        .bind(draft.substation_id)
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.nominal_voltage)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(network)
    }

    async fn update_network(&self, id: i32, draft: &NetworkDraft) -> Result<Network, StoreError> {
        sqlx::query_as::<_, Network>(
            "UPDATE tb_rede_mt SET id_subestacao = $1, codigo = $2, nome = $3, \
             tensao_nominal = $4 WHERE id_rede_mt = $5 \
             RETURNING id_rede_mt AS id, id_subestacao AS substation_id, codigo AS code, \
             nome AS name, tensao_nominal AS nominal_voltage",
        )
        .bind(draft.substation_id)
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.nominal_voltage)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| StoreError::NotFound(format!("network {} not found", id)))
    }

    async fn delete_network(&self, id: i32) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tb_rede_mt WHERE id_rede_mt = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

fn map_db_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        match db.code().as_deref() {
            Some("23505") => return StoreError::UniqueViolation(db.message().to_string()),
            Some("23503") => return StoreError::ForeignKeyViolation(db.message().to_string()),
            _ => {}
        }
    }
    StoreError::Sqlx(err)
}
