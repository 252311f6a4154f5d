use tera::Tera;

// compiled in so the binary runs from any working directory
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("accounts/register.html", include_str!("../templates/accounts/register.html")),
    ("accounts/login.html", include_str!("../templates/accounts/login.html")),
    ("accounts/profile.html", include_str!("../templates/accounts/profile.html")),
    ("accounts/edit_profile.html", include_str!("../templates/accounts/edit_profile.html")),
];

pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}
