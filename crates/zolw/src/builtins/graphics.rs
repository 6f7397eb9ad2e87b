use kurbo::Point;

use crate::{
    env::Env,
    proc::{fn_many, fn_one, fn_two, fn_zero, Arity},
    turtle::{palette_color, rgb_color, PenMode, TurtleMode},
    typ::Value,
    Error,
};

fn point(v: Value) -> Result<Point, Error> {
    match v {
        Value::List(items) if items.len() == 2 => {
            let x = f64::try_from(items[0].clone())?;
            let y = f64::try_from(items[1].clone())?;
            Ok(Point::new(x, y))
        }
        _ => Err(Error::ExpectedPair),
    }
}

fn pair(x: f64, y: f64) -> Vec<Value> {
    vec![Value::num(x), Value::num(y)]
}

fn color(v: Value) -> Result<String, Error> {
    if let Some(x) = v.as_number() {
        return Ok(palette_color(x as i64).to_owned());
    }
    match v {
        Value::List(items) => {
            let rgb: Option<Vec<f64>> = items.iter().map(Value::as_number).collect();
            match rgb.as_deref() {
                Some(&[r, g, b]) => Ok(rgb_color(r, g, b)),
                _ => Err(Error::ExpectedList),
            }
        }
        other => other.as_word().ok_or(Error::ExpectedString),
    }
}

fn pen_size(v: Value) -> Result<f64, Error> {
    match v {
        Value::List(items) => match items.first() {
            Some(w) => f64::try_from(w.clone()),
            None => Err(Error::ExpectedNumber),
        },
        other => f64::try_from(other),
    }
}

pub(super) fn install(env: &mut Env) {
    env.add_primitive(fn_one("forward", |d: f64, env| {
        env.turtle_do(|t, c| t.forward(d, c))
    }));
    env.add_primitive(fn_one("back", |d: f64, env| {
        env.turtle_do(|t, c| t.forward(-d, c))
    }));
    env.add_primitive(fn_one("left", |a: f64, env| {
        env.turtle_do(|t, c| t.turn(-a, c))
    }));
    env.add_primitive(fn_one("right", |a: f64, env| {
        env.turtle_do(|t, c| t.turn(a, c))
    }));
    env.add_primitive(fn_one("setpos", |p: Value, env| -> Result<(), Error> {
        let p = point(p)?;
        env.turtle_do(|t, c| t.move_to(p, c));
        Ok(())
    }));
    env.add_primitive(fn_two("setxy", |x: f64, y: f64, env| {
        env.turtle_do(|t, c| t.move_to(Point::new(x, y), c))
    }));
    env.add_primitive(fn_one("setx", |x: f64, env| {
        env.turtle_do(|t, c| t.move_to(Point::new(x, t.position.y), c))
    }));
    env.add_primitive(fn_one("sety", |y: f64, env| {
        env.turtle_do(|t, c| t.move_to(Point::new(t.position.x, y), c))
    }));
    env.add_primitive(fn_one("setheading", |a: f64, env| {
        env.turtle_do(|t, c| t.set_heading(a, c))
    }));
    env.add_primitive(fn_zero("home", |env| env.turtle_do(|t, c| t.home(c))));
    env.add_primitive(fn_two("arc", |angle: f64, radius: f64, env| {
        env.turtle_do(|t, c| t.arc(angle, radius, c))
    }));

    env.add_primitive(fn_zero("pos", |env| {
        let p = env.turtle().position;
        pair(p.x, p.y)
    }));
    env.add_primitive(fn_zero("xcor", |env| env.turtle().position.x));
    env.add_primitive(fn_zero("ycor", |env| env.turtle().position.y));
    env.add_primitive(fn_zero("heading", |env| env.turtle().heading));
    env.add_primitive(fn_one("towards", |p: Value, env| -> Result<f64, Error> {
        Ok(env.turtle().towards(point(p)?))
    }));

    env.add_primitive(fn_zero("showturtle", |env| {
        env.turtle_do(|t, c| t.set_visible(true, c))
    }));
    env.add_primitive(fn_zero("hideturtle", |env| {
        env.turtle_do(|t, c| t.set_visible(false, c))
    }));
    env.add_primitive(fn_zero("shownp", |env| env.turtle().visible));
    env.add_primitive(fn_zero("clean", |env| env.turtle_do(|t, c| t.clean(c))));
    env.add_primitive(fn_zero("clearscreen", |env| {
        env.turtle_do(|t, c| t.clear_screen(c))
    }));

    for (name, mode) in [
        ("wrap", TurtleMode::Wrap),
        ("window", TurtleMode::Window),
        ("fence", TurtleMode::Fence),
    ] {
        env.add_primitive(fn_zero(name, move |env| {
            env.turtle_do(|t, _| t.mode = mode)
        }));
    }
    env.add_primitive(fn_zero("turtlemode", |env| {
        Value::text(env.turtle().mode.name())
    }));

    env.add_primitive(fn_many("label", Arity::variadic(1, 1), |args, env| {
        let text = args
            .iter()
            .map(Value::print_form)
            .collect::<Vec<_>>()
            .join(" ");
        env.turtle_do(|t, c| t.label(&text, c))
    }));
    env.add_primitive(fn_one("setlabelheight", |h: f64, env| {
        env.turtle_do(|t, _| t.label_height = h)
    }));
    env.add_primitive(fn_zero("labelsize", |env| {
        let h = env.turtle().label_height;
        pair(h, h)
    }));

    env.add_primitive(fn_zero("pendown", |env| {
        env.turtle_do(|t, c| t.set_pen_down(true, c))
    }));
    env.add_primitive(fn_zero("penup", |env| {
        env.turtle_do(|t, c| t.set_pen_down(false, c))
    }));
    env.add_primitive(fn_zero("pendownp", |env| env.turtle().pen.down));
    for (name, mode) in [
        ("penpaint", PenMode::Paint),
        ("penerase", PenMode::Erase),
        ("penreverse", PenMode::Reverse),
    ] {
        env.add_primitive(fn_zero(name, move |env| {
            env.turtle_do(|t, c| {
                t.set_pen_mode(mode, c);
                t.set_pen_down(true, c);
            })
        }));
    }
    env.add_primitive(fn_zero("penmode", |env| {
        Value::text(env.turtle().pen.mode.name())
    }));
    env.add_primitive(fn_one("setpencolor", |v: Value, env| -> Result<(), Error> {
        let color = color(v)?;
        env.turtle_do(|t, c| t.set_pen_color(color, c));
        Ok(())
    }));
    env.add_primitive(fn_zero("pencolor", |env| {
        Value::text(env.turtle().pen.color.as_str())
    }));
    env.add_primitive(fn_one("setpensize", |v: Value, env| -> Result<(), Error> {
        let size = pen_size(v)?;
        env.turtle_do(|t, c| t.set_pen_size(size, c));
        Ok(())
    }));
    env.add_primitive(fn_zero("pensize", |env| {
        let s = env.turtle().pen.size;
        pair(s, s)
    }));
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use kurbo::Point;

    use crate::{turtle::Recorder, Env, Error, TurtleMode, Value};

    fn show(env: &mut Env, s: &str) -> String {
        env.eval_str(s).unwrap().unwrap().to_string()
    }

    #[test]
    fn moving() {
        let mut env = Env::default();
        env.eval_str("np 100 pw 90 np 50 lw 45").unwrap();
        assert_eq!(env.turtle().position, Point::new(50.0, 100.0));
        assert_eq!(show(&mut env, "kierunek"), "45");
        env.eval_str("ustalpozxy -20 30 ustalx 5").unwrap();
        assert_eq!(show(&mut env, "poz"), "[5 30]");
        assert_eq!(show(&mut env, "azymut [5 0]"), "180");
        env.eval_str("wróć").unwrap();
        assert_eq!(show(&mut env, "poz"), "[0 0]");
        assert_eq!(env.eval_str("ustalpoz [1]"), Err(Error::ExpectedPair));
    }

    #[test]
    fn modes() {
        let mut env = Env::default();
        assert_eq!(env.turtle().mode, TurtleMode::Wrap);
        env.eval_str("płot").unwrap();
        assert_eq!(show(&mut env, "trybżółwia"), "FENCE");
        env.eval_str("np 1000").unwrap();
        assert_eq!(env.turtle().position, Point::new(0.0, 150.0));
        env.eval_str("okno np 1000").unwrap();
        assert_eq!(env.turtle().position, Point::new(0.0, 1150.0));
    }

    #[test]
    fn pens() {
        let mut env = Env::default();
        env.eval_str("podnieś").unwrap();
        assert_eq!(show(&mut env, "opuszczonyp"), "0");
        env.eval_str("ścieranie").unwrap();
        assert_eq!(show(&mut env, "opuszczonyp"), "1");
        assert_eq!(show(&mut env, "trybpis"), "ERASE");
        env.eval_str("ustalkolpis 4").unwrap();
        assert_eq!(show(&mut env, "kolpis"), "red");
        env.eval_str("ustalkolpis [99 0 0]").unwrap();
        assert_eq!(show(&mut env, "kolpis"), "#ff0000");
        env.eval_str("ustalkolpis \"pink").unwrap();
        assert_eq!(show(&mut env, "kolpis"), "pink");
        env.eval_str("ustalrozmiarpisaka [3 3]").unwrap();
        assert_eq!(show(&mut env, "rozmiarpis"), "[3 3]");
        env.eval_str("schowajmnie").unwrap();
        assert_eq!(show(&mut env, "widocznyp"), "0");
    }

    #[test]
    fn drawing() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut env = Env::default().with_canvas(recorder.clone());
        env.eval_str("np 10 pod np 10 opu pw 90 np 10").unwrap();
        let segments: Vec<_> = recorder
            .borrow()
            .segments()
            .map(|(from, to, _)| (from, to))
            .collect();
        assert_eq!(
            segments,
            vec![
                (Point::new(0.0, 0.0), Point::new(0.0, 10.0)),
                (Point::new(0.0, 20.0), Point::new(10.0, 20.0)),
            ]
        );
        env.eval_str("czyśćekran").unwrap();
        assert_eq!(recorder.borrow().segments().count(), 0);
        assert_eq!(
            env.eval_str("(wpisztekst \"a [b c])"),
            Ok(None::<Value>)
        );
    }
}
