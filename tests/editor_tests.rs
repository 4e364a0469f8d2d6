use shelter_provider::contract::item_uri;
use shelter_provider::editor::{delete_pet, save_pet};
use shelter_provider::{EditorMode, Gender, PetForm, PetProvider, ProviderConfig, SaveOutcome};
use tempfile::TempDir;

async fn create_test_provider() -> (PetProvider, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let config = ProviderConfig::default().with_database_path(temp_dir.path().join("editor.db"));
   let provider = PetProvider::open(&config)
      .await
      .expect("Failed to open test provider");

   (provider, temp_dir)
}

fn toto_form() -> PetForm {
   PetForm {
      name: Some("Toto".into()),
      breed: Some("Terrier".into()),
      gender: Some(Gender::Male),
      weight: Some(7),
   }
}

#[tokio::test]
async fn test_add_then_edit() {
   let (provider, _temp) = create_test_provider().await;

   let SaveOutcome::Inserted(id) = save_pet(&provider, &EditorMode::Add, &toto_form())
      .await
      .unwrap()
   else {
      panic!("expected an insert");
   };

   let mode = EditorMode::for_address(Some(&item_uri(id)));
   let edit = PetForm {
      weight: Some(8),
      breed: Some(String::new()),
      ..Default::default()
   };
   assert_eq!(
      save_pet(&provider, &mode, &edit).await.unwrap(),
      SaveOutcome::Updated(1)
   );

   let pet = provider.get_pet(id).await.unwrap().unwrap();
   assert_eq!(pet.weight, 8);
   assert_eq!(pet.breed, None);
   assert_eq!(pet.name, "Toto");

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_blank_name_is_discarded() {
   let (provider, _temp) = create_test_provider().await;

   let blank = PetForm {
      name: Some("   ".into()),
      ..toto_form()
   };
   assert_eq!(
      save_pet(&provider, &EditorMode::Add, &blank).await.unwrap(),
      SaveOutcome::Discarded
   );

   let unnamed = PetForm {
      name: None,
      ..toto_form()
   };
   assert_eq!(
      save_pet(&provider, &EditorMode::Add, &unnamed).await.unwrap(),
      SaveOutcome::Discarded
   );

   assert!(provider.list_pets().await.unwrap().is_empty());
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_add_with_invalid_weight_fails_validation() {
   let (provider, _temp) = create_test_provider().await;

   let form = PetForm {
      weight: Some(-2),
      ..toto_form()
   };
   let err = save_pet(&provider, &EditorMode::Add, &form).await.unwrap_err();
   assert_eq!(err.invalid_field(), Some("weight"));

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_edit_missing_pet_updates_nothing() {
   let (provider, _temp) = create_test_provider().await;

   let mode = EditorMode::Edit(item_uri(77));
   let form = PetForm {
      weight: Some(3),
      ..Default::default()
   };
   assert_eq!(
      save_pet(&provider, &mode, &form).await.unwrap(),
      SaveOutcome::Updated(0)
   );

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_delete_pet_by_mode() {
   let (provider, _temp) = create_test_provider().await;

   let SaveOutcome::Inserted(id) = save_pet(&provider, &EditorMode::Add, &toto_form())
      .await
      .unwrap()
   else {
      panic!("expected an insert");
   };

   assert_eq!(delete_pet(&provider, &EditorMode::Add).await.unwrap(), 0);
   assert_eq!(
      delete_pet(&provider, &EditorMode::Edit(item_uri(id))).await.unwrap(),
      1
   );
   assert!(provider.get_pet(id).await.unwrap().is_none());

   provider.remove().await.unwrap();
}
