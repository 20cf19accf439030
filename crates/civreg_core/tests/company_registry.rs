use civreg_core::db::open_db_in_memory;
use civreg_core::{
    Company, CompanyRepository, CompanyService, Contact, ContactRepository, LookupRecord,
    LookupRepository, LookupTable, RepoError, SqliteCompanyRepository, SqliteContactRepository,
    SqliteLookupRepository, ValidationError,
};
use rusqlite::Connection;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn child_count(conn: &Connection, table: &str, company_id: i64) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE company_id = ?1;"),
        [company_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn phone_set_lifecycle_is_visible_in_list_view() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
    let mut service = CompanyService::new(repo);

    let mut company = Company::new("Vodokanal");
    company.phones = strings(&["5551234", "5555678"]);
    company.id = service.create_company(&company).unwrap();

    let rows = service.list_companies().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, company.id);
    assert_eq!(rows[0].phones, vec!["5551234", "5555678"]);

    company.phones = strings(&["5551234"]);
    let report = service.update_company(&company).unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.kept, 1);
    let detail = service.get_company(company.id).unwrap().unwrap();
    assert_eq!(detail.phones.len(), 1);
    assert_eq!(detail.phones[0].value, "5551234");

    company.phones.clear();
    service.update_company(&company).unwrap();
    let rows = service.list_companies().unwrap();
    assert!(rows[0].phones.is_empty());
}

#[test]
fn delete_company_removes_children_then_parent() {
    let mut conn = open_db_in_memory().unwrap();
    let company_id = {
        let repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        let mut service = CompanyService::new(repo);

        let mut company = Company::new("Teploset");
        company.phones = strings(&["1111"]);
        company.faxes = strings(&["2222"]);
        company.emails = strings(&["office@teplo.ru"]);
        let id = service.create_company(&company).unwrap();

        service.delete_company(id).unwrap();
        let err = service.get_company(id).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                entity: "company",
                ..
            }
        ));
        id
    };

    assert_eq!(child_count(&conn, "phones", company_id), 0);
    assert_eq!(child_count(&conn, "emails", company_id), 0);
}

#[test]
fn sentinel_id_reads_and_deletes_are_noops() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
    let mut service = CompanyService::new(repo);

    assert_eq!(service.get_company(0).unwrap(), None);
    assert_eq!(service.get_company_select(0).unwrap(), None);
    service.delete_company(0).unwrap();

    let mut ghost = Company::new("Nobody");
    ghost.phones = strings(&["123"]);
    assert!(service.update_company(&ghost).unwrap().is_noop());
    assert!(service.list_companies().unwrap().is_empty());
}

#[test]
fn missing_non_zero_ids_report_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();

    assert!(matches!(
        repo.get_company(42),
        Err(RepoError::NotFound { id: 42, .. })
    ));
    assert!(matches!(
        repo.delete_company(42),
        Err(RepoError::NotFound { id: 42, .. })
    ));

    let mut company = Company::new("Missing");
    company.id = 42;
    assert!(matches!(
        repo.update_company(&company),
        Err(RepoError::NotFound { id: 42, .. })
    ));
}

#[test]
fn invalid_child_value_rejects_whole_write() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();

        let mut company = Company::new("Broken");
        company.phones = strings(&["5551234", "call me"]);
        let err = repo.create_company(&company).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::InvalidPhone(_))
        ));
        assert!(repo.list_companies().unwrap().is_empty());
    }
    let phones: i64 = conn
        .query_row("SELECT COUNT(*) FROM phones;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(phones, 0);
}

#[test]
fn failed_update_leaves_parent_and_children_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();

    let mut company = Company::new("Gorgaz");
    company.emails = strings(&["gaz@city.ru"]);
    company.id = repo.create_company(&company).unwrap();

    let mut renamed = company.clone();
    renamed.name = "Gorgaz Renamed".to_string();
    renamed.emails = strings(&["not-an-email"]);
    assert!(repo.update_company(&renamed).is_err());

    let detail = repo.get_company(company.id).unwrap().unwrap();
    assert_eq!(detail.name, "Gorgaz");
    assert_eq!(detail.emails.len(), 1);
    assert_eq!(detail.emails[0].value, "gaz@city.ru");
}

#[test]
fn get_company_resolves_scope_and_lists_contacts() {
    let mut conn = open_db_in_memory().unwrap();
    let (scope_id, post_id) = {
        let lookups = SqliteLookupRepository::try_new(&conn).unwrap();
        (
            lookups
                .create(LookupTable::Scope, &LookupRecord::new("City"))
                .unwrap(),
            lookups
                .create(LookupTable::Post, &LookupRecord::new("Director"))
                .unwrap(),
        )
    };

    let company_id = {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        let mut company = Company::new("Energosbyt");
        company.scope_id = scope_id;
        company.address = Some("Lenina 1".to_string());
        repo.create_company(&company).unwrap()
    };

    {
        let mut contacts = SqliteContactRepository::try_new(&mut conn).unwrap();
        for name in ["Petrov", "Andreev"] {
            let mut contact = Contact::new(name);
            contact.company_id = company_id;
            contact.post_id = post_id;
            contacts.create_contact(&contact).unwrap();
        }
        contacts.create_contact(&Contact::new("Unemployed")).unwrap();
    }

    let repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
    let detail = repo.get_company(company_id).unwrap().unwrap();
    assert_eq!(detail.address.as_deref(), Some("Lenina 1"));
    assert_eq!(detail.scope.map(|scope| scope.name).as_deref(), Some("City"));
    let names: Vec<_> = detail.contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Andreev", "Petrov"]);
    assert_eq!(detail.contacts[0].post_name.as_deref(), Some("Director"));
    assert_eq!(detail.contacts[0].department_name, None);

    let select = repo.get_company_select(company_id).unwrap().unwrap();
    assert_eq!(select.name, "Energosbyt");
    assert_eq!(repo.list_company_select().unwrap().len(), 1);
}

#[test]
fn deleting_company_keeps_its_contacts() {
    let mut conn = open_db_in_memory().unwrap();
    let company_id = {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        repo.create_company(&Company::new("Short-lived")).unwrap()
    };
    let contact_id = {
        let mut contacts = SqliteContactRepository::try_new(&mut conn).unwrap();
        let mut contact = Contact::new("Survivor");
        contact.company_id = company_id;
        contacts.create_contact(&contact).unwrap()
    };

    {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        repo.delete_company(company_id).unwrap();
    }

    let contacts = SqliteContactRepository::try_new(&mut conn).unwrap();
    let detail = contacts.get_contact(contact_id).unwrap().unwrap();
    assert_eq!(detail.company_id, company_id);
    assert_eq!(detail.company, None);
}

#[test]
fn create_ignores_incoming_id_and_round_trips_through_record() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();

    let mut company = Company::new("  Trimmed  ");
    company.id = 999;
    company.emails = strings(&[" info@firm.ru "]);
    let id = repo.create_company(&company).unwrap();
    assert_ne!(id, 999);

    let detail = repo.get_company(id).unwrap().unwrap();
    assert_eq!(detail.name, "Trimmed");
    let written = detail.to_company();
    assert_eq!(written.emails, vec!["info@firm.ru"]);
    assert!(repo.update_company(&written).unwrap().is_noop());
}

#[test]
fn sentinel_update_succeeds_even_with_invalid_payload() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();

    let mut company = Company::new("");
    company.phones = strings(&["abc"]);
    company.emails = strings(&["not-an-email"]);
    let report = repo.update_company(&company).unwrap();

    assert!(report.is_noop());
    assert!(repo.list_companies().unwrap().is_empty());
}
