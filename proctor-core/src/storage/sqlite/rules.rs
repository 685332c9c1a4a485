//! Rules table: the static authorization table, filtered by
//! `(character, role, method)`.

use proctor_model::{Character, Key, Method, Rule};

use crate::error::{CoreError, Result};

use super::SqliteStorage;

#[derive(sqlx::FromRow)]
struct RuleRow {
    character: String,
    role: String,
    method: String,
    #[sqlx(rename = "type")]
    kind: String,
    name: String,
    namespace: String,
}

impl RuleRow {
    fn into_rule(self) -> Result<Rule> {
        Ok(Rule {
            character: self
                .character
                .parse()
                .map_err(|e| CoreError::internal(format!("corrupt rule row: {e}")))?,
            method: self
                .method
                .parse()
                .map_err(|e| CoreError::internal(format!("corrupt rule row: {e}")))?,
            role: self.role,
            key: Key::new(self.kind, self.name, self.namespace),
        })
    }
}

impl SqliteStorage {
    pub(super) async fn insert_rule(&self, rule: &Rule) -> Result<()> {
        sqlx::query(
            "INSERT INTO rules (character, role, method, type, name, namespace) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(rule.character.as_str())
        .bind(&rule.role)
        .bind(rule.method.as_str())
        .bind(&rule.key.r#type)
        .bind(&rule.key.name)
        .bind(&rule.key.namespace)
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::internal(format!("could not insert rule: {e}")))?;
        Ok(())
    }

    /// All rules applying to `(character, role, method)`. Non-actor rules
    /// are stored with an empty role, so passing the caller's role verbatim
    /// only matters for actors.
    pub async fn rules_for(
        &self,
        character: Character,
        role: &str,
        method: Method,
    ) -> Result<Vec<Rule>> {
        let rows: Vec<RuleRow> = sqlx::query_as(
            "SELECT character, role, method, type, name, namespace FROM rules \
             WHERE character = ? AND role = ? AND method = ?",
        )
        .bind(character.as_str())
        .bind(role)
        .bind(method.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::internal(format!("could not select rules: {e}")))?;

        rows.into_iter().map(RuleRow::into_rule).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::test_support::storage;
    use super::*;

    #[tokio::test]
    async fn rules_are_filtered_by_character_role_and_method() -> anyhow::Result<()> {
        let storage = storage(&["player", "judge"]).await;

        let player_put = storage
            .rules_for(Character::Actor, "player", Method::Put)
            .await?;
        assert_eq!(player_put.len(), 1);
        assert_eq!(player_put[0].key, Key::new("action", "", "game1"));

        let judge_get = storage
            .rules_for(Character::Actor, "judge", Method::Get)
            .await?;
        assert!(judge_get.is_empty());

        let director_put = storage
            .rules_for(Character::Director, "", Method::Put)
            .await?;
        assert!(director_put.is_empty());
        Ok(())
    }
}
