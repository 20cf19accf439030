use civreg_core::db::open_db_in_memory;
use civreg_core::repo::list_view::FlatValue;
use civreg_core::{
    Company, CompanyRepository, Contact, ContactRepository, ListViewRepository, LookupRecord,
    LookupRepository, LookupTable, ParentKind, SqliteCompanyRepository, SqliteContactRepository,
    SqliteListViewRepository, SqliteLookupRepository,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn parent_with_children_and_no_lookup_yields_one_row() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        let mut company = Company::new("Lonely");
        company.phones = strings(&["222", "111"]);
        company.scope_id = 404;
        repo.create_company(&company).unwrap();
    }

    let views = SqliteListViewRepository::try_new(&conn).unwrap();
    let rows = views.list_companies().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].phones, vec!["111", "222"]);
    assert_eq!(rows[0].scope_name, None);
    assert!(rows[0].emails.is_empty());
    assert!(rows[0].faxes.is_empty());
}

#[test]
fn multiple_child_kinds_do_not_multiply_each_other() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        let mut company = Company::new("Busy");
        company.phones = strings(&["1", "2", "3"]);
        company.faxes = strings(&["9", "8"]);
        company.emails = strings(&["a@x", "b@x"]);
        repo.create_company(&company).unwrap();
    }

    let views = SqliteListViewRepository::try_new(&conn).unwrap();
    let rows = views.list_companies().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].phones, vec!["1", "2", "3"]);
    assert_eq!(rows[0].faxes, vec!["8", "9"]);
    assert_eq!(rows[0].emails, vec!["a@x", "b@x"]);
}

#[test]
fn same_company_name_in_different_scopes_stays_separate() {
    let mut conn = open_db_in_memory().unwrap();
    let (city, region) = {
        let lookups = SqliteLookupRepository::try_new(&conn).unwrap();
        (
            lookups
                .create(LookupTable::Scope, &LookupRecord::new("City"))
                .unwrap(),
            lookups
                .create(LookupTable::Scope, &LookupRecord::new("Region"))
                .unwrap(),
        )
    };
    {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        for (scope_id, phone) in [(region, "200"), (city, "100")] {
            let mut company = Company::new("Civil Defense HQ");
            company.scope_id = scope_id;
            company.phones = strings(&[phone]);
            repo.create_company(&company).unwrap();
        }
        repo.create_company(&Company::new("Ambulance")).unwrap();
    }

    let views = SqliteListViewRepository::try_new(&conn).unwrap();
    let rows = views.list_companies().unwrap();
    let summary: Vec<_> = rows
        .iter()
        .map(|row| {
            (
                row.name.as_str(),
                row.scope_name.as_deref(),
                row.phones.clone(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Ambulance", None, vec![]),
            ("Civil Defense HQ", Some("Region"), vec!["200".to_string()]),
            ("Civil Defense HQ", Some("City"), vec!["100".to_string()]),
        ]
    );
}

#[test]
fn contact_view_joins_company_and_post() {
    let mut conn = open_db_in_memory().unwrap();
    let post_id = {
        let lookups = SqliteLookupRepository::try_new(&conn).unwrap();
        lookups
            .create(LookupTable::Post, &LookupRecord::new("Chief"))
            .unwrap()
    };
    let company_id = {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        repo.create_company(&Company::new("Metro")).unwrap()
    };
    {
        let mut repo = SqliteContactRepository::try_new(&mut conn).unwrap();
        let mut chief = Contact::new("Gromov");
        chief.company_id = company_id;
        chief.post_id = post_id;
        chief.phones = strings(&["300"]);
        chief.faxes = strings(&["301"]);
        chief.emails = strings(&["gromov@metro.ru"]);
        repo.create_contact(&chief).unwrap();
        repo.create_contact(&Contact::new("Anonymous")).unwrap();
    }

    let views = SqliteListViewRepository::try_new(&conn).unwrap();
    let rows = views.list_contacts().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].name, "Anonymous");
    assert_eq!(rows[0].company_id, 0);
    assert_eq!(rows[0].company_name, None);
    assert!(rows[0].phones.is_empty());

    assert_eq!(rows[1].name, "Gromov");
    assert_eq!(rows[1].company_id, company_id);
    assert_eq!(rows[1].company_name.as_deref(), Some("Metro"));
    assert_eq!(rows[1].post_name.as_deref(), Some("Chief"));
    assert_eq!(rows[1].phones, vec!["300"]);
    assert_eq!(rows[1].faxes, vec!["301"]);
}

#[test]
fn generic_flat_rows_expose_columns_lookups_and_children() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCompanyRepository::try_new(&mut conn).unwrap();
        let mut company = Company::new("Flat");
        company.address = Some("Main st. 5".to_string());
        company.emails = strings(&["flat@x"]);
        repo.create_company(&company).unwrap();
    }

    let views = SqliteListViewRepository::try_new(&conn).unwrap();
    let rows = views.list_view(ParentKind::Company).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.name, "Flat");
    assert_eq!(
        row.columns.get("address"),
        Some(&FlatValue::Text("Main st. 5".to_string()))
    );
    assert_eq!(row.lookups.get("scope_name"), Some(&None));
    assert_eq!(row.children.get("emails"), Some(&vec!["flat@x".to_string()]));
    assert_eq!(row.children.get("phones"), Some(&Vec::new()));

    assert!(views.list_view(ParentKind::Contact).unwrap().is_empty());
}
