mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn first_category_id(client: &reqwest::Client, base_url: &str) -> Result<String> {
    let res = client
        .get(format!("{}/api/categories", base_url))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "categories unavailable");

    let body: Value = res.json().await?;
    let id = body["data"][0]["id"]
        .as_str()
        .context("no seeded categories")?;
    Ok(id.to_string())
}

fn ingredient_by_name<'a>(recipe: &'a Value, name: &str) -> Option<&'a Value> {
    recipe["ingredients"]
        .as_array()?
        .iter()
        .find(|i| i["name"] == name)
}

#[tokio::test]
async fn recipe_lifecycle_with_ownership() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    common::register(&client, &server.base_url, "Ana", "Gomez", "ana@example.com", "secret1").await?;
    let owner_token = common::login(&client, &server.base_url, "ana@example.com", "secret1").await?;

    common::register(&client, &server.base_url, "Beto", "Diaz", "beto@example.com", "secret2").await?;
    let stranger_token =
        common::login(&client, &server.base_url, "beto@example.com", "secret2").await?;

    let category_id = first_category_id(&client, &server.base_url).await?;

    // Create: quantity/unit are normalized to lower case
    let res = client
        .post(format!("{}/api/recipes", server.base_url))
        .bearer_auth(&owner_token)
        .json(&json!({
            "title": "Tarta",
            "difficulty": "low",
            "categoryId": category_id,
            "ingredients": [
                { "name": "Harina", "quantity": "2", "unit": "Tazas" }
            ],
            "steps": [
                { "order": 1, "description": "Mezclar" }
            ],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    let recipe = &body["data"];
    let recipe_id = recipe["id"].as_str().context("missing recipe id")?.to_string();
    assert_eq!(recipe["title"], "Tarta");
    assert_eq!(recipe["difficulty"], "low");
    let harina = ingredient_by_name(recipe, "Harina").context("missing ingredient")?;
    assert_eq!(harina["unit"], "tazas");

    // The recipe is publicly readable
    let res = client
        .get(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Patch: same ingredient name updates in place; blank title is dropped
    // by the sanitizer and leaves the field untouched
    let res = client
        .patch(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .bearer_auth(&owner_token)
        .json(&json!({
            "title": "",
            "ingredients": [
                { "name": "Harina", "quantity": "3", "unit": "tazas" }
            ],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let recipe = &body["data"];
    assert_eq!(recipe["title"], "Tarta");
    assert_eq!(recipe["ingredients"].as_array().map(Vec::len), Some(1));
    let harina = ingredient_by_name(recipe, "Harina").context("missing ingredient")?;
    assert_eq!(harina["quantity"], "3");

    // Patch with an unknown ingredient name inserts a second child
    let res = client
        .patch(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .bearer_auth(&owner_token)
        .json(&json!({
            "ingredients": [
                { "name": "Azucar", "quantity": "1", "unit": "Taza" }
            ],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let recipe = &body["data"];
    assert_eq!(recipe["ingredients"].as_array().map(Vec::len), Some(2));
    let azucar = ingredient_by_name(recipe, "Azucar").context("missing ingredient")?;
    assert_eq!(azucar["unit"], "taza");
    // The original child survived untouched
    let harina = ingredient_by_name(recipe, "Harina").context("missing ingredient")?;
    assert_eq!(harina["quantity"], "3");

    // A non-owner cannot delete; the recipe remains intact
    let res = client
        .delete(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .bearer_auth(&stranger_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The owner can
    let res = client
        .delete(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .bearer_auth(&owner_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/recipes/{}", server.base_url, recipe_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn recipe_creation_is_validated() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    common::register(&client, &server.base_url, "Ana", "Gomez", "ana@example.com", "secret1").await?;
    let token = common::login(&client, &server.base_url, "ana@example.com", "secret1").await?;
    let category_id = first_category_id(&client, &server.base_url).await?;

    // Unauthenticated creation is rejected before the service runs
    let res = client
        .post(format!("{}/api/recipes", server.base_url))
        .json(&json!({
            "title": "Tarta",
            "categoryId": category_id,
            "ingredients": [{ "name": "Harina" }],
            "steps": [{ "order": 1, "description": "Mezclar" }],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Empty child collections fail naming the collection
    let res = client
        .post(format!("{}/api/recipes", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Tarta",
            "categoryId": category_id,
            "ingredients": [],
            "steps": [],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await?;
    assert_eq!(
        body["field_errors"]["ingredients"][0],
        "There must be at least one ingredient"
    );
    assert_eq!(
        body["field_errors"]["steps"][0],
        "There must be at least one step"
    );

    // Non-positive numeric fields are rejected
    let res = client
        .post(format!("{}/api/recipes", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Tarta",
            "prepTime": 0,
            "categoryId": category_id,
            "ingredients": [{ "name": "Harina" }],
            "steps": [{ "order": 1, "description": "Mezclar" }],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["prepTime"][0], "Must be a positive integer");

    // A malformed id parameter never reaches the handler
    let res = client
        .get(format!("{}/api/recipes/not-a-uuid", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}
