use super::{Notice, escape, login_link, notice_html, standalone};
use crate::backend::{
    FieldErrors, FieldKind, GENDERS, PatientForm, ProfileData, ProfileField, Registration,
};
use crate::routes::{LOGIN_PATH, OTP_PATH, Params, REGISTER_PATH, Screen};
use std::fmt::Write as _;

fn field_error(errors: &FieldErrors, name: &str) -> String {
    errors
        .get(name)
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default()
}

fn input(name: &str, label: &str, kind: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><input id="{name}" name="{name}" type="{kind}" value="{value}">{error}</div>"#,
        label = escape(label),
        value = escape(value),
        error = field_error(errors, name),
    )
}

pub fn login(
    notice: Option<&Notice>,
    email: &str,
    next: Option<&str>,
    errors: &FieldErrors,
) -> String {
    let next = next
        .map(|next| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(next)))
        .unwrap_or_default();
    let content = format!(
        r#"<h1>Login</h1>{notice}<form method="post" action="{LOGIN_PATH}">{next}{email}{password}<button type="submit">Login</button></form><p>No account? <a href="{REGISTER_PATH}">Register your hospital</a></p>"#,
        notice = notice_html(notice),
        email = input("email", "Email", "email", email, errors),
        password = input("password", "Password", "password", "", errors),
    );
    standalone(Screen::Login.title(), &content)
}

pub fn otp(notice: Option<&Notice>) -> String {
    let content = format!(
        r#"<h1>Verify OTP</h1>{notice}<p>Enter the code sent to your registered contact.</p><form method="post" action="{OTP_PATH}"><div class="field"><label for="otp">OTP</label><input id="otp" name="otp" inputmode="numeric" autocomplete="one-time-code" required></div><button type="submit">Verify</button></form>{back}"#,
        notice = notice_html(notice),
        back = login_link(),
    );
    standalone(Screen::Otp.title(), &content)
}

pub fn register(
    notice: Option<&Notice>,
    form: Option<&Registration>,
    errors: &FieldErrors,
) -> String {
    let (name, email, phone) = form.map_or(("", "", ""), |form| {
        (
            form.hospital_name.as_str(),
            form.email.as_str(),
            form.phone_number.as_str(),
        )
    });
    let content = format!(
        r#"<h1>Register</h1>{notice}<form method="post" action="{REGISTER_PATH}">{name}{email}{phone}{password}<button type="submit">Register</button></form>{back}"#,
        notice = notice_html(notice),
        name = input("hospitalName", "Hospital Name", "text", name, errors),
        email = input("email", "Email", "email", email, errors),
        phone = input("phoneNumber", "Phone Number", "tel", phone, errors),
        password = input("password", "Password", "password", "", errors),
        back = login_link(),
    );
    standalone(Screen::Register.title(), &content)
}

pub fn not_found() -> String {
    let content = String::from(
        r#"<h1>Page not found</h1><p>The page you requested does not exist.</p><a href="/">Go home</a>"#
    );
    standalone(Screen::NotFound.title(), &content)
}

/// Content for screens that have no backend operations yet.
pub fn placeholder(screen: Screen, params: &Params) -> String {
    let mut content = format!("<h1>{}</h1>", escape(screen.title()));
    if let Some(doctor_id) = params.get("doctorId") {
        let _ = write!(content, "<p>Doctor ID: {}</p>", escape(doctor_id));
    }
    content.push_str("<section class=\"panel\"><p>Nothing to show yet.</p></section>");
    content
}

pub fn profile(
    profile: &ProfileData,
    editing: bool,
    notice: Option<&Notice>,
    errors: &FieldErrors,
) -> String {
    let mut rows = String::new();
    for field in ProfileField::ALL {
        let key = field.key();
        let label = escape(field.label());
        let value = field.value(profile);
        if editing && field.editable() {
            let control = match field.kind() {
                FieldKind::TextArea => format!(
                    r#"<textarea id="{key}" name="{key}">{}</textarea>"#,
                    escape(&value)
                ),
                FieldKind::Number => format!(
                    r#"<input id="{key}" name="{key}" type="number" min="0" value="{}">"#,
                    escape(&value)
                ),
                FieldKind::Text | FieldKind::File => format!(
                    r#"<input id="{key}" name="{key}" type="text" value="{}">"#,
                    escape(&value)
                ),
            };
            let _ = write!(
                rows,
                r#"<div class="field"><label for="{key}">{label}</label>{control}{}</div>"#,
                field_error(errors, key)
            );
        } else {
            let shown = match (field.kind(), value.is_empty()) {
                (FieldKind::File, true) => "No file uploaded".to_string(),
                _ => escape(&value),
            };
            let _ = write!(
                rows,
                r#"<div class="field" data-field="{key}"><label>{label}</label><p>{shown}</p></div>"#
            );
        }
    }

    let notice = notice_html(notice);
    if editing {
        format!(
            r#"<h1>Profile</h1>{notice}<form method="post" action="/profile">{rows}<button type="submit">Save</button> <a href="/profile">Cancel</a></form>"#
        )
    } else {
        format!(
            r#"<h1>Profile</h1>{notice}<section class="panel">{rows}</section><a href="/profile?edit=true">Edit</a>"#
        )
    }
}

pub fn profile_unavailable(message: &str) -> String {
    format!(
        r#"<h1>Profile</h1>{}"#,
        Notice::error(message).render()
    )
}

pub fn role(form: &PatientForm, notice: Option<&Notice>, errors: &FieldErrors) -> String {
    let mut gender = String::from(r#"<option value="">Select Gender</option>"#);
    for option in GENDERS {
        let selected = if form.gender == option { " selected" } else { "" };
        let _ = write!(gender, r#"<option value="{option}"{selected}>{option}</option>"#);
    }

    format!(
        r#"<h1>Add Role</h1>{notice}<form method="post" action="/role">{name}<div class="field"><label for="gender">Gender</label><select id="gender" name="gender">{gender}</select>{gender_error}</div>{email}{phone}{dob}{pan}{aadhaar}{role_name}<button type="submit">Submit</button></form>"#,
        notice = notice_html(notice),
        name = input("name", "Name", "text", &form.name, errors),
        gender_error = field_error(errors, "gender"),
        email = input("email", "Email", "email", &form.email, errors),
        phone = input("phoneNumber", "Phone Number", "tel", &form.phone_number, errors),
        dob = input("dateOfBirth", "Date of Birth", "date", &form.date_of_birth, errors),
        pan = input("panCard", "PAN Card", "text", &form.pan_card, errors),
        aadhaar = input("aadhaarCard", "Aadhaar Card", "text", &form.aadhaar_card, errors),
        role_name = input("roleName", "Role Name", "text", &form.role_name, errors),
    )
}
